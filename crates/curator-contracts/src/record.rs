//! The flat record type the pipeline evaluates and rewrites.
//!
//! A `Record` is a flat field → value mapping.  Conditions compare only
//! top-level fields; nested objects and arrays may appear as values but are
//! never traversed by the rule engine.

use serde_json::Value;

/// A flat field → value mapping.
///
/// This is the shape of the `"metadata"` member of a legacy input document,
/// and the shape every transformation phase consumes and produces.
pub type Record = serde_json::Map<String, Value>;

/// Return true when `value` is a JSON scalar: null, boolean, number, or string.
///
/// The rule grammar and the `then` assignment table only admit scalars;
/// objects and arrays in those positions are validation errors.
pub fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

/// Human-readable JSON type word for diagnostics ("object", "array", …).
///
/// Used by the rule validator so error messages read
/// `"… must be an object, got string"`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

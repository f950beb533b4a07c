//! Rule-definition validation: raw JSON in, well-formed `Patch` out.
//!
//! The grammar for a `when` object, at every nesting level:
//!
//! - an object whose keys are all plain field names with scalar values
//!   (an implicit AND of exact matches), or
//! - an object whose keys are a subset of `{__must__, __should__}`, each
//!   holding an array of further condition objects.
//!
//! Mixing reserved and plain keys at one level is rejected, as is a plain
//! key holding a non-scalar value. The second rule is what catches a
//! misspelled operator: `{"must": [...]}` is rejected naming `must` instead
//! of being treated as a field that happens to hold an array.

use serde_json::Value;

use curator_contracts::{is_scalar, type_name};

use crate::condition::Condition;
use crate::error::ValidationError;
use crate::patch::Patch;

const MUST: &str = "__must__";
const SHOULD: &str = "__should__";

/// Validate one raw rule definition and build a `Patch`.
///
/// `index` is the rule's position in its batch and appears in every
/// diagnostic path. Fail-fast: the first defect found is returned and the
/// rest of the rule is not inspected.
pub fn parse_patch(raw: &Value, index: usize) -> Result<Patch, ValidationError> {
    let path = format!("patch {index}");

    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Err(ValidationError::NotAnObject {
                path,
                found: type_name(raw),
            })
        }
    };

    for key in ["when", "then"] {
        if !obj.contains_key(key) {
            return Err(ValidationError::MissingKey {
                path: path.clone(),
                key,
            });
        }
    }
    if let Some(extra) = obj.keys().find(|k| *k != "when" && *k != "then") {
        return Err(ValidationError::UnrecognizedKey {
            path,
            key: extra.clone(),
        });
    }

    let when_raw = &obj["when"];
    let when = parse_when(when_raw, &format!("{path}: when"))?;
    let then = parse_then(&obj["then"], &format!("{path}: then"))?;

    Ok(Patch {
        when,
        when_source: when_raw.clone(),
        then,
        source_file: None,
    })
}

/// Parse a `when` object (top-level or nested) into a condition tree.
fn parse_when(raw: &Value, path: &str) -> Result<Condition, ValidationError> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Err(ValidationError::NotAnObject {
                path: path.to_string(),
                found: type_name(raw),
            })
        }
    };

    // An empty condition object matches every record.
    if obj.is_empty() {
        return Ok(Condition::All(vec![]));
    }

    let has_reserved = obj.keys().any(|k| k == MUST || k == SHOULD);

    if has_reserved {
        // Operator form. A plain key alongside an operator is a grammar
        // violation, not a field match.
        if let Some(plain) = obj.keys().find(|k| *k != MUST && *k != SHOULD) {
            return Err(ValidationError::UnrecognizedKey {
                path: path.to_string(),
                key: plain.clone(),
            });
        }

        let mut children = Vec::new();
        if let Some(items) = obj.get(MUST) {
            children.push(Condition::All(parse_items(
                items,
                &format!("{path}.{MUST}"),
            )?));
        }
        if let Some(items) = obj.get(SHOULD) {
            children.push(Condition::Any(parse_items(
                items,
                &format!("{path}.{SHOULD}"),
            )?));
        }

        // A lone operator stands on its own; co-occurring operators are
        // ANDed together.
        if children.len() == 1 {
            return Ok(children.pop().unwrap_or(Condition::All(vec![])));
        }
        return Ok(Condition::All(children));
    }

    // Field-match form: every value must be a scalar. A non-scalar value
    // is treated as a misspelled operator and rejected by key name.
    let mut pairs = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        if !is_scalar(value) {
            return Err(ValidationError::UnrecognizedKey {
                path: path.to_string(),
                key: key.clone(),
            });
        }
        pairs.push((key.clone(), value.clone()));
    }
    Ok(Condition::FieldMatch(pairs))
}

/// Parse the array value of a `__must__`/`__should__` key.
fn parse_items(raw: &Value, path: &str) -> Result<Vec<Condition>, ValidationError> {
    let items = match raw.as_array() {
        Some(items) => items,
        None => {
            return Err(ValidationError::WrongType {
                path: path.to_string(),
                expected: "an array",
                found: type_name(raw),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_when(item, &format!("{path}[{i}]")))
        .collect()
}

/// Parse a `then` object into ordered field assignments.
///
/// Every value must be a scalar. `null` is legal and preserved; it is an
/// explicit assignment, not an omission.
fn parse_then(raw: &Value, path: &str) -> Result<Vec<(String, Value)>, ValidationError> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Err(ValidationError::NotAnObject {
                path: path.to_string(),
                found: type_name(raw),
            })
        }
    };

    let mut assignments = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        if !is_scalar(value) {
            return Err(ValidationError::WrongType {
                path: format!("{path}.{key}"),
                expected: "a scalar",
                found: type_name(value),
            });
        }
        assignments.push((key.clone(), value.clone()));
    }
    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::parse_patch;
    use crate::condition::Condition;
    use crate::error::ValidationError;

    fn parse(raw: Value) -> Result<crate::patch::Patch, ValidationError> {
        parse_patch(&raw, 0)
    }

    // ── Top-level shape ───────────────────────────────────────────────────────

    #[test]
    fn rule_must_be_an_object() {
        let err = parse(json!(["when", "then"])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAnObject {
                path: "patch 0".to_string(),
                found: "array",
            }
        );
    }

    #[test]
    fn missing_when_is_rejected() {
        let err = parse(json!({ "then": { "a": 1 } })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingKey {
                path: "patch 0".to_string(),
                key: "when",
            }
        );
    }

    #[test]
    fn missing_then_is_rejected() {
        let err = parse(json!({ "when": {} })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingKey {
                path: "patch 0".to_string(),
                key: "then",
            }
        );
    }

    #[test]
    fn extra_top_level_key_is_rejected() {
        let err = parse(json!({
            "when": {},
            "then": { "a": 1 },
            "comment": "why is this here"
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnrecognizedKey {
                path: "patch 0".to_string(),
                key: "comment".to_string(),
            }
        );
    }

    /// The diagnostic path carries the rule's batch position.
    #[test]
    fn index_appears_in_the_path() {
        let err = parse_patch(&json!(42), 7).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAnObject {
                path: "patch 7".to_string(),
                found: "number",
            }
        );
    }

    // ── `when` grammar ────────────────────────────────────────────────────────

    #[test]
    fn empty_when_parses_to_vacuous_all() {
        let patch = parse(json!({ "when": {}, "then": { "a": 1 } })).unwrap();
        assert_eq!(patch.when, Condition::All(vec![]));
    }

    #[test]
    fn plain_keys_parse_to_field_match() {
        let patch = parse(json!({
            "when": { "assay_type": "RNA-seq", "protocol_version": "v2" },
            "then": { "a": 1 }
        }))
        .unwrap();
        assert_eq!(
            patch.when,
            Condition::FieldMatch(vec![
                ("assay_type".to_string(), json!("RNA-seq")),
                ("protocol_version".to_string(), json!("v2")),
            ])
        );
    }

    #[test]
    fn must_alone_parses_to_all() {
        let patch = parse(json!({
            "when": { "__must__": [ { "a": "1" }, { "b": "2" } ] },
            "then": { "x": 1 }
        }))
        .unwrap();
        assert_eq!(
            patch.when,
            Condition::All(vec![
                Condition::FieldMatch(vec![("a".to_string(), json!("1"))]),
                Condition::FieldMatch(vec![("b".to_string(), json!("2"))]),
            ])
        );
    }

    #[test]
    fn should_alone_parses_to_any() {
        let patch = parse(json!({
            "when": { "__should__": [ { "a": "1" } ] },
            "then": { "x": 1 }
        }))
        .unwrap();
        assert_eq!(
            patch.when,
            Condition::Any(vec![Condition::FieldMatch(vec![(
                "a".to_string(),
                json!("1")
            )])])
        );
    }

    /// Co-occurring operators at one level are conjoined: the record must
    /// satisfy all of `__must__` and at least one of `__should__`.
    #[test]
    fn co_occurring_operators_are_anded() {
        let patch = parse(json!({
            "when": {
                "__must__": [ { "kind": "sample" } ],
                "__should__": [ { "organ": "heart" }, { "organ": "lung" } ]
            },
            "then": { "x": 1 }
        }))
        .unwrap();
        assert_eq!(
            patch.when,
            Condition::All(vec![
                Condition::All(vec![Condition::FieldMatch(vec![(
                    "kind".to_string(),
                    json!("sample")
                )])]),
                Condition::Any(vec![
                    Condition::FieldMatch(vec![("organ".to_string(), json!("heart"))]),
                    Condition::FieldMatch(vec![("organ".to_string(), json!("lung"))]),
                ]),
            ])
        );
    }

    #[test]
    fn operators_nest() {
        let patch = parse(json!({
            "when": { "__must__": [
                { "__should__": [ { "a": "1" }, { "b": "2" } ] }
            ] },
            "then": { "x": 1 }
        }))
        .unwrap();
        assert_eq!(
            patch.when,
            Condition::All(vec![Condition::Any(vec![
                Condition::FieldMatch(vec![("a".to_string(), json!("1"))]),
                Condition::FieldMatch(vec![("b".to_string(), json!("2"))]),
            ])])
        );
    }

    /// A misspelled operator is rejected by key name, never treated as an
    /// always-false (or always-true) field match.
    #[test]
    fn misspelled_operator_is_rejected() {
        let err = parse(json!({
            "when": { "must": [ { "a": "1" } ] },
            "then": { "x": 1 }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnrecognizedKey {
                path: "patch 0: when".to_string(),
                key: "must".to_string(),
            }
        );
    }

    #[test]
    fn plain_key_alongside_operator_is_rejected() {
        let err = parse(json!({
            "when": { "__must__": [ { "a": "1" } ], "organ": "heart" },
            "then": { "x": 1 }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnrecognizedKey {
                path: "patch 0: when".to_string(),
                key: "organ".to_string(),
            }
        );
    }

    #[test]
    fn operator_value_must_be_an_array() {
        let err = parse(json!({
            "when": { "__must__": { "a": "1" } },
            "then": { "x": 1 }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                path: "patch 0: when.__must__".to_string(),
                expected: "an array",
                found: "object",
            }
        );
    }

    /// The diagnostic for a bad array element carries its index.
    #[test]
    fn operator_item_must_be_an_object() {
        let err = parse(json!({
            "when": { "__must__": [ { "a": "1" }, "oops" ] },
            "then": { "x": 1 }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAnObject {
                path: "patch 0: when.__must__[1]".to_string(),
                found: "string",
            }
        );
    }

    #[test]
    fn nested_defects_carry_the_full_path() {
        let err = parse(json!({
            "when": { "__should__": [
                { "__must__": "not-an-array" }
            ] },
            "then": { "x": 1 }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                path: "patch 0: when.__should__[0].__must__".to_string(),
                expected: "an array",
                found: "string",
            }
        );
    }

    // ── `then` grammar ────────────────────────────────────────────────────────

    #[test]
    fn then_must_be_an_object() {
        let err = parse(json!({ "when": {}, "then": [1, 2] })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAnObject {
                path: "patch 0: then".to_string(),
                found: "array",
            }
        );
    }

    #[test]
    fn then_values_must_be_scalars() {
        let err = parse(json!({
            "when": {},
            "then": { "assay": { "nested": true } }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                path: "patch 0: then.assay".to_string(),
                expected: "a scalar",
                found: "object",
            }
        );
    }

    /// `null` in `then` is a legal, preserved assignment.
    #[test]
    fn then_null_is_preserved() {
        let patch = parse(json!({
            "when": {},
            "then": { "donor_status": null }
        }))
        .unwrap();
        assert_eq!(
            patch.then,
            vec![("donor_status".to_string(), Value::Null)]
        );
    }

    #[test]
    fn then_preserves_definition_order() {
        let patch = parse(json!({
            "when": {},
            "then": { "b": 2, "a": 1, "c": 3 }
        }))
        .unwrap();
        let fields: Vec<&str> = patch.then.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(fields, vec!["b", "a", "c"]);
    }

    /// The verbatim `when` JSON survives on the patch for provenance.
    #[test]
    fn when_source_is_verbatim() {
        let when = json!({ "__must__": [ { "a": "1" } ] });
        let patch = parse(json!({ "when": when.clone(), "then": { "x": 1 } })).unwrap();
        assert_eq!(patch.when_source, when);
    }
}

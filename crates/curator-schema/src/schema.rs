//! The target schema: field declarations loaded from a JSON schema file.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use curator_contracts::{type_name, CuratorError, CuratorResult};

/// One field declared by the target schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// The field's name in the target vocabulary.
    pub name: String,

    /// Human-readable purpose of the field.
    #[serde(default)]
    pub description: Option<String>,

    /// Declared type word ("string", "number", ...). Informational.
    #[serde(default)]
    pub field_type: Option<String>,

    /// Whether a compliant record must carry this field.
    #[serde(default)]
    pub required: bool,

    /// Pattern that string values of this field must match in full.
    #[serde(default)]
    pub regex: Option<String>,

    /// Value filled in when the input record lacks this field.
    #[serde(default)]
    pub default_value: Option<Value>,

    /// Closed vocabulary for this field. Empty means unconstrained.
    #[serde(default)]
    pub permissible_values: Vec<Value>,
}

/// The loaded target schema: an ordered list of field declarations.
///
/// Field order is the declaration order in the schema file and dictates
/// the field order of transformed records. `regex` constraints are
/// compiled once at load time; a pattern that does not compile fails the
/// load.
#[derive(Debug)]
pub struct TargetSchema {
    fields: Vec<FieldSpec>,
    patterns: BTreeMap<String, Regex>,
}

impl TargetSchema {
    /// Load a schema file: a JSON array of field declaration objects.
    ///
    /// Array entries that are not objects, or lack a string `name`, are
    /// skipped with a warning rather than failing the load; a schema file
    /// in the wild often carries annotation entries alongside the real
    /// declarations. Structural problems (missing file, bad JSON,
    /// non-array top level, uncompilable regex) are `SchemaLoad` errors.
    pub fn load_file(path: &Path) -> CuratorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CuratorError::SchemaLoad {
            reason: format!("failed to read schema file '{}': {e}", path.display()),
        })?;
        let raw: Value = serde_json::from_str(&contents).map_err(|e| CuratorError::SchemaLoad {
            reason: format!("invalid JSON in schema file '{}': {e}", path.display()),
        })?;
        let items = match raw {
            Value::Array(items) => items,
            other => {
                return Err(CuratorError::SchemaLoad {
                    reason: format!(
                        "schema file '{}' must contain a JSON array, got {}",
                        path.display(),
                        type_name(&other)
                    ),
                })
            }
        };

        let mut fields: Vec<FieldSpec> = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let is_named_object = item
                .as_object()
                .is_some_and(|obj| obj.get("name").is_some_and(Value::is_string));
            if !is_named_object {
                warn!(index, "skipping schema entry without a name");
                continue;
            }
            let spec: FieldSpec =
                serde_json::from_value(item).map_err(|e| CuratorError::SchemaLoad {
                    reason: format!(
                        "schema entry {index} in '{}' is malformed: {e}",
                        path.display()
                    ),
                })?;
            fields.push(spec);
        }

        let mut patterns = BTreeMap::new();
        for spec in &fields {
            if let Some(pattern) = &spec.regex {
                // Anchored so the declared pattern must cover the whole value.
                let compiled =
                    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| CuratorError::SchemaLoad {
                        reason: format!(
                            "field '{}' in '{}' has an invalid regex: {e}",
                            spec.name,
                            path.display()
                        ),
                    })?;
                patterns.insert(spec.name.clone(), compiled);
            }
        }

        info!(file = %path.display(), fields = fields.len(), "loaded target schema");
        Ok(Self { fields, patterns })
    }

    /// All declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// The declaration for `name`, if the schema has one.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of all required fields, in declaration order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// True when the schema declares `name` as required.
    pub fn is_required(&self, name: &str) -> bool {
        self.field(name).is_some_and(|f| f.required)
    }

    /// The declared default for `name`, if any.
    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.field(name)?.default_value.as_ref()
    }

    /// The compiled regex for `name`, if the declaration carries one.
    pub(crate) fn pattern(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use serde_json::json;
    use tempfile::TempDir;

    use curator_contracts::CuratorError;

    use super::TargetSchema;

    fn write_schema(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    const SCHEMA: &str = r#"[
        { "name": "organ", "required": true,
          "permissible_values": ["heart", "lung"] },
        { "name": "protocol_version", "regex": "^v[0-9]+$" },
        { "name": "notes", "default_value": "" }
    ]"#;

    #[test]
    fn loads_fields_in_declaration_order() {
        let (_dir, path) = write_schema(SCHEMA);
        let schema = TargetSchema::load_file(&path).unwrap();

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["organ", "protocol_version", "notes"]);
        assert_eq!(schema.required_fields(), vec!["organ"]);
        assert!(schema.is_required("organ"));
        assert!(!schema.is_required("notes"));
        assert_eq!(schema.default_value("notes"), Some(&json!("")));
        assert_eq!(schema.default_value("organ"), None);
    }

    /// Entries without a name are skipped, not fatal.
    #[test]
    fn nameless_entries_are_skipped() {
        let (_dir, path) = write_schema(
            r#"[
                { "comment": "header block" },
                "stray string",
                { "name": "organ" }
            ]"#,
        );
        let schema = TargetSchema::load_file(&path).unwrap();
        assert_eq!(schema.fields().len(), 1);
        assert_eq!(schema.fields()[0].name, "organ");
    }

    #[test]
    fn non_array_file_is_rejected() {
        let (_dir, path) = write_schema(r#"{ "name": "organ" }"#);
        let err = TargetSchema::load_file(&path).unwrap_err();
        match err {
            CuratorError::SchemaLoad { reason } => assert!(reason.contains("JSON array")),
            other => panic!("expected SchemaLoad, got {other:?}"),
        }
    }

    #[test]
    fn invalid_regex_fails_the_load() {
        let (_dir, path) = write_schema(r#"[ { "name": "organ", "regex": "([" } ]"#);
        let err = TargetSchema::load_file(&path).unwrap_err();
        match err {
            CuratorError::SchemaLoad { reason } => {
                assert!(reason.contains("organ"));
                assert!(reason.contains("regex"));
            }
            other => panic!("expected SchemaLoad, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = TargetSchema::load_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CuratorError::SchemaLoad { .. }));
    }
}

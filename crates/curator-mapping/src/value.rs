//! The per-field value-translation dictionary.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use curator_contracts::{type_name, CuratorError, CuratorResult};
use curator_provenance::ProcessingLog;

use crate::list_json_files;

/// Maps legacy values to target values, per field.
///
/// Loaded from `*.json` files in a directory. Each file holds a JSON
/// object whose entries take one of two shapes:
///
/// - `"field": { "legacy": target, ... }` — a translation table for that
///   field;
/// - `"legacy": target` where target is not an object — a direct pair
///   attributed to the file stem as the field name, so a file named
///   `organ.json` containing `{ "Heart": "heart" }` translates values of
///   the `organ` field.
///
/// Lookup is by the legacy value's canonical string form, so a dictionary
/// keyed with `"2"` translates both the string `"2"` and the number `2`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    tables: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ValueMap {
    /// The empty dictionary. `map_value` returns every value unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every `*.json` file directly in `dir`, in lexicographic order.
    ///
    /// Later files extend earlier tables; on a conflicting legacy key the
    /// first-loaded entry wins and the conflict is logged at warn level.
    pub fn load_dir(dir: &Path) -> CuratorResult<Self> {
        let files = list_json_files(dir).map_err(|reason| CuratorError::ValueMapping { reason })?;

        let mut map = Self::empty();
        for file in &files {
            map.load_into(file)?;
        }

        info!(dir = %dir.display(), files = files.len(), fields = map.tables.len(), "loaded value maps");
        Ok(map)
    }

    fn load_into(&mut self, path: &Path) -> CuratorResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| CuratorError::ValueMapping {
            reason: format!("failed to read value map '{}': {e}", path.display()),
        })?;
        let raw: Value = serde_json::from_str(&contents).map_err(|e| CuratorError::ValueMapping {
            reason: format!("invalid JSON in value map '{}': {e}", path.display()),
        })?;
        let obj = match raw {
            Value::Object(obj) => obj,
            other => {
                return Err(CuratorError::ValueMapping {
                    reason: format!(
                        "value map '{}' must contain a JSON object, got {}",
                        path.display(),
                        type_name(&other)
                    ),
                })
            }
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut entries = 0usize;
        for (key, value) in obj {
            match value {
                // "field": { "legacy": target, ... }
                Value::Object(table) => {
                    for (legacy, target) in table {
                        self.insert(&key, legacy, target, path);
                        entries += 1;
                    }
                }
                // "legacy": target — attributed to the file stem.
                target => {
                    self.insert(&stem, key, target, path);
                    entries += 1;
                }
            }
        }

        debug!(file = %path.display(), entries, "loaded value map");
        Ok(())
    }

    fn insert(&mut self, field: &str, legacy: String, target: Value, file: &Path) {
        let table = self.tables.entry(field.to_string()).or_default();
        match table.get(&legacy) {
            Some(existing) if *existing != target => {
                warn!(
                    field = %field,
                    legacy = %legacy,
                    file = %file.display(),
                    "conflicting value mapping, keeping first"
                );
            }
            Some(_) => {}
            None => {
                table.insert(legacy, target);
            }
        }
    }

    /// Translate `value` for `field`, recording what happened in `log`.
    ///
    /// - No table for the field, or no entry for the value: unchanged,
    ///   nothing logged.
    /// - Entry is an array with several candidates: unchanged, recorded as
    ///   ambiguous for a curator to resolve.
    /// - Entry is a one-element array: unwrapped and applied.
    /// - Entry is a scalar or `null`: applied. A `null` target is a known
    ///   value with no translation yet; it is applied and logged like any
    ///   other.
    pub fn map_value(&self, field: &str, value: &Value, log: &mut ProcessingLog) -> Value {
        let Some(table) = self.tables.get(field) else {
            return value.clone();
        };
        let key = canonical_key(value);
        let Some(target) = table.get(&key) else {
            return value.clone();
        };

        let applied = match target {
            Value::Array(candidates) if candidates.len() > 1 => {
                debug!(field = %field, candidates = candidates.len(), "ambiguous value mapping");
                log.add_ambiguous_value(field, value.clone(), candidates.clone());
                return value.clone();
            }
            Value::Array(candidates) => match candidates.first() {
                Some(only) => only.clone(),
                // An empty candidate list translates to nothing.
                None => return value.clone(),
            },
            other => other.clone(),
        };

        log.add_mapped_value(field, &key, applied.clone());
        applied
    }

    /// Number of fields with a translation table.
    pub fn field_count(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// The canonical lookup key for a record value: strings verbatim, every
/// other scalar in its JSON spelling (`true`, `2`, `2.5`, `null`).
fn canonical_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use serde_json::json;
    use tempfile::TempDir;

    use curator_contracts::CuratorError;
    use curator_provenance::ProcessingLog;

    use super::ValueMap;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn load(files: &[(&str, &str)]) -> ValueMap {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            write(dir.path(), name, contents);
        }
        ValueMap::load_dir(dir.path()).unwrap()
    }

    // ── Loading shapes ────────────────────────────────────────────────────────

    #[test]
    fn nested_tables_key_by_field() {
        let map = load(&[(
            "maps.json",
            r#"{ "organ": { "Heart": "heart", "Lung": "lung" } }"#,
        )]);
        let mut log = ProcessingLog::new();

        assert_eq!(map.map_value("organ", &json!("Heart"), &mut log), json!("heart"));
        assert_eq!(map.field_count(), 1);
    }

    /// Direct pairs take their field name from the file stem.
    #[test]
    fn flat_pairs_use_the_file_stem() {
        let map = load(&[("organ.json", r#"{ "Heart": "heart" }"#)]);
        let mut log = ProcessingLog::new();

        assert_eq!(map.map_value("organ", &json!("Heart"), &mut log), json!("heart"));
        assert_eq!(map.map_value("tissue", &json!("Heart"), &mut log), json!("Heart"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad.json", "{ nope");
        let err = ValueMap::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CuratorError::ValueMapping { .. }));
    }

    // ── Lookup semantics ──────────────────────────────────────────────────────

    #[test]
    fn unmapped_field_and_value_pass_through() {
        let map = load(&[("organ.json", r#"{ "Heart": "heart" }"#)]);
        let mut log = ProcessingLog::new();

        assert_eq!(map.map_value("organ", &json!("Spleen"), &mut log), json!("Spleen"));
        assert_eq!(map.map_value("status", &json!("Heart"), &mut log), json!("Heart"));
        assert!(log.is_empty());
    }

    /// Lookup keys are canonical strings: the number 2 hits an entry keyed
    /// with "2".
    #[test]
    fn numbers_match_string_keys() {
        let map = load(&[("protocol_version.json", r#"{ "2": "v2" }"#)]);
        let mut log = ProcessingLog::new();

        assert_eq!(
            map.map_value("protocol_version", &json!(2), &mut log),
            json!("v2")
        );
        assert_eq!(
            map.map_value("protocol_version", &json!("2"), &mut log),
            json!("v2")
        );
    }

    /// A multi-candidate array is reported as ambiguous; the value stays.
    #[test]
    fn ambiguous_mapping_is_logged_not_applied() {
        let map = load(&[(
            "tissue.json",
            r#"{ "mixed": ["heart", "lung"] }"#,
        )]);
        let mut log = ProcessingLog::new();

        let result = map.map_value("tissue", &json!("mixed"), &mut log);
        assert_eq!(result, json!("mixed"));
        assert_eq!(log.ambiguous_mappings.len(), 1);
        assert_eq!(log.ambiguous_mappings[0].candidates, vec![json!("heart"), json!("lung")]);
        assert!(log.value_mappings.is_empty());
    }

    /// A one-element array is unwrapped and applied.
    #[test]
    fn single_candidate_array_is_unwrapped() {
        let map = load(&[("tissue.json", r#"{ "cardiac": ["heart"] }"#)]);
        let mut log = ProcessingLog::new();

        assert_eq!(map.map_value("tissue", &json!("cardiac"), &mut log), json!("heart"));
        assert_eq!(log.ambiguous_mappings.len(), 0);
        let encoded = serde_json::to_value(&log).unwrap();
        assert_eq!(encoded["value_mappings"]["tissue"]["cardiac"], json!("heart"));
    }

    /// A `null` target is applied and logged: the value is known, its
    /// translation is not decided yet.
    #[test]
    fn null_target_is_applied_and_logged() {
        let map = load(&[("organ.json", r#"{ "Unknown": null }"#)]);
        let mut log = ProcessingLog::new();

        let result = map.map_value("organ", &json!("Unknown"), &mut log);
        assert_eq!(result, serde_json::Value::Null);
        let encoded = serde_json::to_value(&log).unwrap();
        assert_eq!(
            encoded["value_mappings"]["organ"]["Unknown"],
            serde_json::Value::Null
        );
    }

    /// Conflicts across files: first (lexicographic) wins.
    #[test]
    fn conflicting_entries_first_wins() {
        let map = load(&[
            ("a.json", r#"{ "organ": { "Heart": "heart" } }"#),
            ("b.json", r#"{ "organ": { "Heart": "cardiac" } }"#),
        ]);
        let mut log = ProcessingLog::new();

        assert_eq!(map.map_value("organ", &json!("Heart"), &mut log), json!("heart"));
    }

    #[test]
    fn empty_directory_yields_empty_map() {
        let dir = TempDir::new().unwrap();
        let map = ValueMap::load_dir(dir.path()).unwrap();
        assert!(map.is_empty());
    }
}

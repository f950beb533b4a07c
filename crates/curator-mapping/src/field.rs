//! The legacy-to-target field-name dictionary.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use curator_contracts::{type_name, CuratorError, CuratorResult};

use crate::list_json_files;

/// Maps legacy field names to target field names.
///
/// Loaded from JSON object files of the form
/// `{ "legacy_name": "target_name", "retired_name": null }`. A `null`
/// target means the legacy field is known but has no target yet; it stays
/// unmapped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    mappings: BTreeMap<String, Option<String>>,
}

impl FieldMap {
    /// The empty dictionary. `map_field` answers `None` for every name.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a single dictionary file.
    ///
    /// The file must hold a JSON object whose values are strings or `null`;
    /// anything else is a `FieldMapping` error naming the file and key.
    pub fn load_file(path: &Path) -> CuratorResult<Self> {
        let obj = read_object(path)?;

        let mut mappings = BTreeMap::new();
        for (legacy, target) in obj {
            let target = match target {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => {
                    return Err(CuratorError::FieldMapping {
                        reason: format!(
                            "mapping for '{legacy}' in '{}' must be a string or null, got {}",
                            path.display(),
                            type_name(&other)
                        ),
                    })
                }
            };
            mappings.insert(legacy, target);
        }

        debug!(file = %path.display(), entries = mappings.len(), "loaded field map");
        Ok(Self { mappings })
    }

    /// Load and merge every `*.json` file directly in `dir`, in
    /// lexicographic order.
    ///
    /// On a conflict (same legacy name, different target) the first-loaded
    /// entry wins and the conflict is logged at warn level.
    pub fn load_dir(dir: &Path) -> CuratorResult<Self> {
        let files = list_json_files(dir).map_err(|reason| CuratorError::FieldMapping { reason })?;

        let mut merged = Self::empty();
        for file in &files {
            let next = Self::load_file(file)?;
            for (legacy, target) in next.mappings {
                match merged.mappings.get(&legacy) {
                    Some(existing) if *existing != target => {
                        warn!(
                            legacy = %legacy,
                            kept = ?existing,
                            ignored = ?target,
                            file = %file.display(),
                            "conflicting field mapping, keeping first"
                        );
                    }
                    Some(_) => {}
                    None => {
                        merged.mappings.insert(legacy, target);
                    }
                }
            }
        }

        info!(dir = %dir.display(), files = files.len(), entries = merged.mappings.len(), "loaded field maps");
        Ok(merged)
    }

    /// The target name for `legacy`, or `None` when the name is unknown or
    /// its target is `null`.
    pub fn map_field(&self, legacy: &str) -> Option<&str> {
        self.mappings.get(legacy)?.as_deref()
    }

    /// Number of dictionary entries, including `null` targets.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Read `path` and parse it as a JSON object.
fn read_object(path: &Path) -> CuratorResult<serde_json::Map<String, Value>> {
    let contents = std::fs::read_to_string(path).map_err(|e| CuratorError::FieldMapping {
        reason: format!("failed to read mapping file '{}': {e}", path.display()),
    })?;
    let raw: Value = serde_json::from_str(&contents).map_err(|e| CuratorError::FieldMapping {
        reason: format!("invalid JSON in mapping file '{}': {e}", path.display()),
    })?;
    match raw {
        Value::Object(obj) => Ok(obj),
        other => Err(CuratorError::FieldMapping {
            reason: format!(
                "mapping file '{}' must contain a JSON object, got {}",
                path.display(),
                type_name(&other)
            ),
        }),
    }
}

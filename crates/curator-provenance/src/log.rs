//! The structured processing log accumulated across transformation phases.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use curator_rules::AppliedPatch;

/// A value that mapped to more than one candidate target.
///
/// Ambiguity is reported, never resolved silently: the original value stays
/// in the record and the candidates are listed here for a curator to act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousValue {
    /// The field whose value was looked up.
    pub field: String,

    /// The original value, left unchanged in the record.
    pub value: Value,

    /// Every candidate target the dictionary offered.
    pub candidates: Vec<Value>,
}

/// Everything a transformation did to one record, by category.
///
/// Each phase appends to its own section; `merge` combines the per-phase
/// logs into the final record-level log. Serializes to the JSON object
/// embedded in the output document under `processing_log`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingLog {
    /// Legacy field name → target field name, one entry per renamed field.
    pub field_mappings: Map<String, Value>,

    /// Field name → { legacy value string → applied target value }.
    pub value_mappings: Map<String, Value>,

    /// Values with more than one candidate target, left unmapped.
    pub ambiguous_mappings: Vec<AmbiguousValue>,

    /// Input fields dropped because the target schema does not declare them.
    pub excluded_data: Map<String, Value>,

    /// Every conditional patch assignment, in application order.
    pub metadata_patches: Vec<AppliedPatch>,
}

impl ProcessingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `legacy` was renamed to `target`.
    pub fn add_mapped_field(&mut self, legacy: &str, target: &str) {
        self.field_mappings
            .insert(legacy.to_string(), Value::String(target.to_string()));
    }

    /// Record that `field`'s value `legacy` became `applied`.
    ///
    /// Entries for one field accumulate under a single sub-object keyed by
    /// the legacy value's string form.
    pub fn add_mapped_value(&mut self, field: &str, legacy: &str, applied: Value) {
        let entry = self
            .value_mappings
            .entry(field.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = entry {
            map.insert(legacy.to_string(), applied);
        }
    }

    /// Record an ambiguous lookup: `value` had several candidate targets.
    pub fn add_ambiguous_value(&mut self, field: &str, value: Value, candidates: Vec<Value>) {
        self.ambiguous_mappings.push(AmbiguousValue {
            field: field.to_string(),
            value,
            candidates,
        });
    }

    /// Record that `field` (holding `value`) was dropped by the schema phase.
    pub fn add_excluded_field(&mut self, field: &str, value: Value) {
        self.excluded_data.insert(field.to_string(), value);
    }

    /// Record one conditional patch assignment.
    pub fn add_applied_patch(&mut self, patch: AppliedPatch) {
        self.metadata_patches.push(patch);
    }

    /// Fold `other`'s entries into this log, section by section.
    ///
    /// List sections append in order; map sections let `other`'s entries
    /// overwrite same-key entries here, since later phases report later
    /// facts.
    pub fn merge(&mut self, other: ProcessingLog) {
        self.field_mappings.extend(other.field_mappings);
        for (field, entry) in other.value_mappings {
            match (self.value_mappings.get_mut(&field), entry) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming);
                }
                (_, entry) => {
                    self.value_mappings.insert(field, entry);
                }
            }
        }
        self.ambiguous_mappings.extend(other.ambiguous_mappings);
        self.excluded_data.extend(other.excluded_data);
        self.metadata_patches.extend(other.metadata_patches);
    }

    /// True when no section has any entries.
    pub fn is_empty(&self) -> bool {
        self.field_mappings.is_empty()
            && self.value_mappings.is_empty()
            && self.ambiguous_mappings.is_empty()
            && self.excluded_data.is_empty()
            && self.metadata_patches.is_empty()
    }
}

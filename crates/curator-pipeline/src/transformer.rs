//! The four-phase metadata transformer.
//!
//! Phase order is fixed:
//!
//! 0. conditional patching (rule engine)
//! 1. field-name mapping
//! 2. value mapping
//! 3. schema compliance
//!
//! Each phase consumes the previous phase's output; nothing feeds back.
//! The input record is never mutated, and a `Transformer` is immutable
//! after construction, so one instance can serve concurrent callers.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use curator_contracts::{CuratorError, CuratorResult, Record};
use curator_mapping::{FieldMap, ValueMap};
use curator_provenance::{ProcessingLog, RunManifest};
use curator_rules::{PatchApplier, RuleSet};
use curator_schema::{SchemaApplier, TargetSchema};

use crate::diff::{diff, sort_ops, PatchOp};

/// The result of transforming one record.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// The fully transformed record, shaped to the target schema.
    pub metadata: Record,

    /// RFC 6902 operations from source to transformed record, sorted.
    pub json_patch: Vec<PatchOp>,

    /// Everything the phases did, by category.
    pub log: ProcessingLog,

    /// The sealed identity of this run.
    pub manifest: RunManifest,
}

/// Runs the four transformation phases over records.
///
/// Owns all loaded state (rules, dictionaries, schema); construction is
/// the only time any of it is read from disk.
#[derive(Debug)]
pub struct Transformer {
    rules: RuleSet,
    fields: FieldMap,
    values: ValueMap,
    schema: TargetSchema,
}

impl Transformer {
    pub fn new(rules: RuleSet, fields: FieldMap, values: ValueMap, schema: TargetSchema) -> Self {
        Self {
            rules,
            fields,
            values,
            schema,
        }
    }

    /// Transform one record through all four phases.
    ///
    /// The JSON Patch is assembled from per-phase diffs and sorted, so two
    /// runs over the same input produce the same operation list.
    pub fn transform_record(&self, metadata: &Record) -> TransformOutcome {
        let mut log = ProcessingLog::new();
        let mut json_patch = Vec::new();

        // Phase 0: conditional patching.
        let applier = PatchApplier::new(&self.rules);
        let outcome = applier.apply(metadata);
        for applied in outcome.applied {
            log.add_applied_patch(applied);
        }
        let patched = outcome.record;
        json_patch.extend(diff(metadata, &patched));

        // Phase 1: field-name mapping.
        let renamed = self.map_fields(&patched, &mut log);
        json_patch.extend(diff(&patched, &renamed));

        // Phase 2: value mapping.
        let mut valued = Record::new();
        for (field, value) in &renamed {
            let mapped = self.values.map_value(field, value, &mut log);
            valued.insert(field.clone(), mapped);
        }
        json_patch.extend(diff(&renamed, &valued));

        // Phase 3: schema compliance.
        let shaped = SchemaApplier::new(&self.schema).apply(&valued, &mut log);
        json_patch.extend(diff(&valued, &shaped));

        sort_ops(&mut json_patch);
        let manifest = RunManifest::seal(metadata);

        info!(
            run_id = %manifest.run_id,
            patches = log.metadata_patches.len(),
            renamed = log.field_mappings.len(),
            excluded = log.excluded_data.len(),
            "transformed record"
        );

        TransformOutcome {
            metadata: shaped,
            json_patch,
            log,
            manifest,
        }
    }

    /// Rename record fields through the field dictionary.
    ///
    /// Unmapped fields keep their legacy name. When two legacy fields land
    /// on the same target name, the first one in record order wins and the
    /// later one's value is discarded, with a warning.
    fn map_fields(&self, record: &Record, log: &mut ProcessingLog) -> Record {
        let mut renamed = Record::new();
        for (field, value) in record {
            let target = self.fields.map_field(field);
            let new_name = target.unwrap_or(field.as_str());

            if renamed.contains_key(new_name) {
                warn!(
                    legacy = %field,
                    target = %new_name,
                    "field collision after renaming, discarding later value"
                );
                continue;
            }
            if let Some(target) = target {
                debug!(legacy = %field, target = %target, "renamed field");
                log.add_mapped_field(field, target);
            }
            renamed.insert(new_name.to_string(), value.clone());
        }
        renamed
    }

    /// Transform the `metadata` member of a JSON document file.
    ///
    /// The file must hold a JSON object. Its `metadata` member, when
    /// present, must itself be an object; a missing member transforms the
    /// empty record. Returns the original document extended with
    /// `modified_metadata`, `json_patch`, `processing_log`, and `run`
    /// members. Read and parse failures are `FileProcessing` errors.
    pub fn transform_file(&self, input: &Path) -> CuratorResult<Value> {
        let contents =
            std::fs::read_to_string(input).map_err(|e| CuratorError::FileProcessing {
                reason: format!("failed to read '{}': {e}", input.display()),
            })?;
        let raw: Value =
            serde_json::from_str(&contents).map_err(|e| CuratorError::FileProcessing {
                reason: format!("invalid JSON in '{}': {e}", input.display()),
            })?;
        let mut doc = match raw {
            Value::Object(doc) => doc,
            other => {
                return Err(CuratorError::FileProcessing {
                    reason: format!(
                        "'{}' must contain a JSON object, got {}",
                        input.display(),
                        curator_contracts::type_name(&other)
                    ),
                })
            }
        };

        let metadata = match doc.get("metadata") {
            None => Record::new(),
            Some(Value::Object(metadata)) => metadata.clone(),
            Some(other) => {
                return Err(CuratorError::FileProcessing {
                    reason: format!(
                        "'metadata' in '{}' must be an object, got {}",
                        input.display(),
                        curator_contracts::type_name(other)
                    ),
                })
            }
        };

        let outcome = self.transform_record(&metadata);

        doc.insert(
            "modified_metadata".to_string(),
            Value::Object(outcome.metadata),
        );
        doc.insert(
            "json_patch".to_string(),
            serde_json::to_value(&outcome.json_patch).map_err(|e| {
                CuratorError::FileProcessing {
                    reason: format!("failed to encode json_patch: {e}"),
                }
            })?,
        );
        doc.insert(
            "processing_log".to_string(),
            serde_json::to_value(&outcome.log).map_err(|e| CuratorError::FileProcessing {
                reason: format!("failed to encode processing_log: {e}"),
            })?,
        );
        doc.insert(
            "run".to_string(),
            serde_json::to_value(&outcome.manifest).map_err(|e| CuratorError::FileProcessing {
                reason: format!("failed to encode run manifest: {e}"),
            })?,
        );

        Ok(Value::Object(doc))
    }
}

//! Ordered application of patch rules to a record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use curator_contracts::Record;

use crate::patch::RuleSet;

/// One field assignment performed by a matched rule.
///
/// A rule whose `then` writes three fields produces three of these, in
/// `then` order. `conditions` is the author's verbatim `when` JSON, so a
/// provenance reader sees the condition as written, not a reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPatch {
    /// Position of the rule in the rule set's application order.
    pub rule_index: usize,

    /// The field that was written.
    pub field: String,

    /// The value that was written. May be `null` (an explicit unset).
    pub value: Value,

    /// Verbatim `when` JSON of the matching rule.
    pub conditions: Value,

    /// File the rule was loaded from, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
}

/// Result of applying a rule set to one record.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// The patched record. The input record is never mutated.
    pub record: Record,

    /// Every assignment performed, in application order. Two rules writing
    /// the same field produce two entries; the record holds the later value.
    pub applied: Vec<AppliedPatch>,
}

/// Applies a rule set to records, in order, with provenance.
///
/// Borrows the rule set read-only, so one shared `RuleSet` can serve any
/// number of concurrent `apply` calls without locking.
#[derive(Debug, Clone, Copy)]
pub struct PatchApplier<'a> {
    rules: &'a RuleSet,
}

impl<'a> PatchApplier<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Apply every matching rule to `record`, returning the patched copy
    /// and the assignments performed.
    ///
    /// Rules are evaluated in set order against the accumulated state: a
    /// `when` that references a field written by an earlier rule in the
    /// same call sees the updated value. Later assignments to a field
    /// overwrite earlier ones; the log records both.
    ///
    /// One pass per call. A rule whose `then` makes another rule's `when`
    /// true only takes effect if that other rule comes later in the order;
    /// rule authors who need a fixpoint must order their rules accordingly.
    pub fn apply(&self, record: &Record) -> PatchOutcome {
        let mut working = record.clone();
        let mut applied = Vec::new();

        for (rule_index, patch) in self.rules.all_rules().iter().enumerate() {
            if !patch.when.evaluate(&working) {
                continue;
            }

            for (field, value) in &patch.then {
                debug!(
                    rule_index,
                    field = %field,
                    "patch rule matched, assigning field"
                );
                working.insert(field.clone(), value.clone());
                applied.push(AppliedPatch {
                    rule_index,
                    field: field.clone(),
                    value: value.clone(),
                    conditions: patch.when_source.clone(),
                    source_file: patch.source_file.clone(),
                });
            }
        }

        PatchOutcome {
            record: working,
            applied,
        }
    }
}

//! Validated patch rules and the ordered, immutable rule set.

use std::path::PathBuf;

use serde_json::Value;

use crate::condition::Condition;

/// One validated conditional patch rule.
///
/// Constructed only by `validate::parse_patch`, so every `Patch` in hand is
/// well-formed: `when` is a parsed condition tree and every `then` value is
/// a scalar. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// The parsed condition tree evaluated against a record.
    pub when: Condition,

    /// The verbatim `when` JSON from the rule definition, retained so
    /// provenance entries can show the author's original condition rather
    /// than a reconstruction.
    pub when_source: Value,

    /// Field assignments applied on match, in definition order. Values are
    /// scalars; `null` is a legal value and means an explicit unset.
    pub then: Vec<(String, Value)>,

    /// The file this rule was loaded from, when loaded from disk.
    pub source_file: Option<PathBuf>,
}

/// An ordered collection of validated patch rules.
///
/// Order is the application order and is fixed at load time. A `RuleSet`
/// is never mutated after construction; `merge` consumes both operands and
/// returns a new set. Sharing one `RuleSet` across threads is safe because
/// evaluation and application only ever read it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    patches: Vec<Patch>,
}

impl RuleSet {
    /// Build a rule set from already-validated patches, preserving order.
    pub fn new(patches: Vec<Patch>) -> Self {
        Self { patches }
    }

    /// The empty rule set. Applying it leaves every record unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append `other`'s rules after this set's rules, returning a new set.
    ///
    /// Both operands are consumed; the originals cannot drift out of sync
    /// with the merged result.
    pub fn merge(mut self, other: RuleSet) -> RuleSet {
        self.patches.extend(other.patches);
        self
    }

    /// Number of rules in the set.
    pub fn count(&self) -> usize {
        self.patches.len()
    }

    /// True when the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// All rules in application order.
    pub fn all_rules(&self) -> &[Patch] {
        &self.patches
    }
}

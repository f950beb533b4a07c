//! The condition tree evaluated against a record.
//!
//! `Condition` is a closed sum type — an unexpected key in a rule definition
//! can never silently fall through as "always true", because the validator
//! rejects it before a `Condition` is ever constructed.

use serde_json::Value;

use curator_contracts::Record;

/// A boolean predicate tree over a flat record.
///
/// Built only by the validator (`parse_patch`), so a `Condition` in hand is
/// always well-formed: field-match values are scalars, and operator nodes
/// contain only further `Condition`s.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Implicit AND over `(field, expected)` pairs.
    ///
    /// A pair matches when the record contains the field and its value is
    /// exactly equal to the expected scalar. A missing field, or a value of
    /// a different JSON type, is a non-match — never an error.
    FieldMatch(Vec<(String, Value)>),

    /// `__must__`: true iff every child is true. Empty is vacuously true.
    All(Vec<Condition>),

    /// `__should__`: true iff at least one child is true. Empty is false —
    /// deliberately asymmetric with `All`, so an empty alternative list can
    /// never fire a rule.
    Any(Vec<Condition>),
}

impl Condition {
    /// Evaluate this condition against `record`.
    ///
    /// Total and pure: no error channel, no side effects. Short-circuits on
    /// the first decisive child. Recursion depth equals the nesting depth of
    /// the rule definition; realistic rule trees are tens of levels at most.
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            Condition::FieldMatch(pairs) => pairs
                .iter()
                .all(|(field, expected)| record.get(field) == Some(expected)),
            Condition::All(children) => children.iter().all(|c| c.evaluate(record)),
            Condition::Any(children) => children.iter().any(|c| c.evaluate(record)),
        }
    }
}

//! Compliance checks of a record against the target schema.
//!
//! Checking is report-only: it never modifies a record and never feeds
//! back into the transformation. All failures are accumulated, so one
//! report shows everything wrong with a record at once.

use serde::Serialize;
use serde_json::Value;

use curator_contracts::Record;

use crate::schema::TargetSchema;

/// The verdict for a single field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueCheck {
    /// The value satisfies every constraint the schema declares for it.
    Ok,

    /// The field has a closed vocabulary and the value is not in it.
    NotPermitted { allowed: Vec<Value> },

    /// The field has a regex constraint the string value does not match.
    RegexMismatch { pattern: String },

    /// The schema does not declare this field at all.
    UnknownField,
}

/// One failed check in a compliance report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    pub value: Value,
    pub problem: ValueCheck,
}

/// Everything non-compliant about one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceReport {
    /// Required fields the record does not carry at all.
    pub missing_required: Vec<String>,

    /// Per-field constraint failures, in record field order.
    pub violations: Vec<Violation>,
}

impl ComplianceReport {
    /// True when nothing is missing and nothing violates a constraint.
    pub fn is_compliant(&self) -> bool {
        self.missing_required.is_empty() && self.violations.is_empty()
    }
}

impl TargetSchema {
    /// Check one value against the constraints declared for `field`.
    ///
    /// `null` satisfies any constraint set: absence-of-value concerns are
    /// the report's `missing_required` side, not a value violation. Regex
    /// constraints apply to string values only.
    pub fn check_value(&self, field: &str, value: &Value) -> ValueCheck {
        let Some(spec) = self.field(field) else {
            return ValueCheck::UnknownField;
        };
        if value.is_null() {
            return ValueCheck::Ok;
        }

        if !spec.permissible_values.is_empty() && !spec.permissible_values.contains(value) {
            return ValueCheck::NotPermitted {
                allowed: spec.permissible_values.clone(),
            };
        }

        if let (Some(pattern), Some(text)) = (self.pattern(field), value.as_str()) {
            if !pattern.is_match(text) {
                return ValueCheck::RegexMismatch {
                    pattern: spec.regex.clone().unwrap_or_default(),
                };
            }
        }

        ValueCheck::Ok
    }

    /// Check every field of `record` and every required declaration,
    /// accumulating all failures.
    pub fn compliance_report(&self, record: &Record) -> ComplianceReport {
        let mut report = ComplianceReport::default();

        for required in self.required_fields() {
            if !record.contains_key(required) {
                report.missing_required.push(required.to_string());
            }
        }

        for (field, value) in record {
            match self.check_value(field, value) {
                ValueCheck::Ok => {}
                problem => report.violations.push(Violation {
                    field: field.clone(),
                    value: value.clone(),
                    problem,
                }),
            }
        }

        report
    }
}

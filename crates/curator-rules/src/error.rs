//! Structured errors for rule validation and rule-set loading.
//!
//! `ValidationError` pinpoints a single defect inside one rule definition;
//! its `path` names the exact location (e.g. `patch 0: when.__must__[1]`)
//! so a rule author can fix the file without guessing. `RuleSetError` covers
//! file-level failures and wraps per-rule validation failures together with
//! the offending file. Both convert into `CuratorError::RuleSet` at the
//! crate boundary.

use std::path::PathBuf;

use thiserror::Error;

use curator_contracts::CuratorError;

/// A defect found while validating a single rule definition.
///
/// Every variant carries `path`, the dotted location of the defect within
/// the batch (`patch 3: when.__should__[0]`). Validation is fail-fast, so
/// at most one of these is ever produced per load.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A position that must hold a JSON object holds something else.
    #[error("{path} must be an object, got {found}")]
    NotAnObject { path: String, found: &'static str },

    /// A required key (`when` or `then`) is absent.
    #[error("{path} is missing required key '{key}'")]
    MissingKey { path: String, key: &'static str },

    /// A key that the rule grammar does not admit at this position.
    ///
    /// Also produced for a misspelled operator: a plain field key whose
    /// value is not a scalar (e.g. `must` holding an array) is rejected by
    /// naming the key, never silently treated as a field match.
    #[error("{path} has unrecognized key '{key}'")]
    UnrecognizedKey { path: String, key: String },

    /// A value of the wrong JSON type at an otherwise valid position.
    #[error("{path} must be {expected}, got {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A failure while loading a rule-set file or directory.
///
/// File-level variants name the file; `Invalid` additionally carries the
/// in-file location via the wrapped `ValidationError`.
#[derive(Debug, Error)]
pub enum RuleSetError {
    /// The given rule path does not exist.
    #[error("rule path not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// `load_dir` was pointed at something that is not a directory.
    #[error("rule path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// `load_file` was pointed at something that is not a regular file.
    #[error("rule path is not a file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read rule file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON in rule file '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed but its top level is not a JSON array of rules.
    #[error("rule file '{}' must contain a JSON array, got {found}", path.display())]
    NotAnArray { path: PathBuf, found: &'static str },

    /// One rule in the file failed validation.
    #[error("invalid rule in '{}': {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl From<RuleSetError> for CuratorError {
    fn from(err: RuleSetError) -> Self {
        CuratorError::RuleSet {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use curator_contracts::CuratorError;

    use super::{RuleSetError, ValidationError};

    #[test]
    fn validation_error_names_the_exact_location() {
        let err = ValidationError::NotAnObject {
            path: "patch 0: when.__must__[1]".to_string(),
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "patch 0: when.__must__[1] must be an object, got string"
        );
    }

    #[test]
    fn unrecognized_key_names_the_key() {
        let err = ValidationError::UnrecognizedKey {
            path: "patch 2: when".to_string(),
            key: "must".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'must'"));
        assert!(msg.contains("patch 2"));
    }

    #[test]
    fn rule_set_error_wraps_validation_with_the_file() {
        let err = RuleSetError::Invalid {
            path: PathBuf::from("/rules/assay.json"),
            source: ValidationError::MissingKey {
                path: "patch 1".to_string(),
                key: "then",
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("/rules/assay.json"));
        assert!(msg.contains("patch 1 is missing required key 'then'"));
    }

    #[test]
    fn converts_into_unified_rule_set_variant() {
        let err: CuratorError = RuleSetError::NotFound {
            path: PathBuf::from("/missing"),
        }
        .into();
        match err {
            CuratorError::RuleSet { reason } => {
                assert!(reason.contains("/missing"));
            }
            other => panic!("expected RuleSet, got {other:?}"),
        }
    }
}

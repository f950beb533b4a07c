//! Unified error types for the CURATOR pipeline.
//!
//! All fallible operations across the workspace return `CuratorResult<T>`.
//! Variants carry a formatted `reason` with enough context (file path, rule
//! index, offending key) to act on without re-running with a debugger.
//! The rule engine keeps its own structured validation variants internally
//! and converts them into `RuleSet` at the crate boundary.

use thiserror::Error;

/// The unified error type for the CURATOR pipeline.
#[derive(Debug, Error)]
pub enum CuratorError {
    /// A field-mapping dictionary could not be loaded or is malformed.
    #[error("field mapping error: {reason}")]
    FieldMapping { reason: String },

    /// A value-mapping dictionary could not be loaded or is malformed.
    #[error("value mapping error: {reason}")]
    ValueMapping { reason: String },

    /// The target schema file could not be loaded or is malformed.
    #[error("schema load error: {reason}")]
    SchemaLoad { reason: String },

    /// A legacy input document could not be read, parsed, or transformed.
    #[error("file processing error: {reason}")]
    FileProcessing { reason: String },

    /// A rule-definition file failed to load or a rule failed validation.
    ///
    /// Loading is fail-fast: the first bad rule aborts the whole batch, so a
    /// transformation can never run against a partially-loaded rule set.
    #[error("rule set error: {reason}")]
    RuleSet { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the CURATOR crates.
pub type CuratorResult<T> = Result<T, CuratorError>;

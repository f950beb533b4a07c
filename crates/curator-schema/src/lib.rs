//! # curator-schema
//!
//! The target-schema side of the CURATOR pipeline: [`TargetSchema`] models
//! the destination vocabulary (field names, requiredness, defaults,
//! permissible values, regex constraints), [`SchemaApplier`] shapes a
//! record to it as the final transformation phase, and the compliance
//! checks in [`check`] report how far a record is from the schema without
//! changing it.

pub mod applier;
pub mod check;
pub mod schema;

pub use applier::SchemaApplier;
pub use check::{ComplianceReport, ValueCheck, Violation};
pub use schema::{FieldSpec, TargetSchema};

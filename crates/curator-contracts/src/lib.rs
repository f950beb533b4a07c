//! # curator-contracts
//!
//! Shared types and error contracts for the CURATOR metadata pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod error;
pub mod record;
pub mod run;

pub use error::{CuratorError, CuratorResult};
pub use record::{is_scalar, type_name, Record};
pub use run::RunId;

//! # curator-provenance
//!
//! Provenance types for the CURATOR pipeline: the structured
//! [`ProcessingLog`] that records what each transformation phase did to a
//! record, and the sealed [`RunManifest`] that ties an output back to its
//! source document.
//!
//! Phases write into the log through narrow `add_*` methods; nothing in
//! this crate interprets the entries. The manifest is sealed exactly once
//! per run, after the last phase.

pub mod log;
pub mod manifest;

pub use log::{AmbiguousValue, ProcessingLog};
pub use manifest::{fingerprint, RunManifest};

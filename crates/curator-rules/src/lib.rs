//! # curator-rules
//!
//! The conditional patch rule engine for the CURATOR pipeline.
//!
//! ## Overview
//!
//! A rule is a `{ "when": ..., "then": ... }` JSON object: `when` is a
//! condition tree over a flat record (plain field→scalar matches, combined
//! with the `__must__`/`__should__` operators), `then` is a set of scalar
//! field assignments applied when the condition holds.
//!
//! Rules are validated on load ([`validate::parse_patch`]), collected into
//! an ordered, immutable [`RuleSet`], and applied to records by a
//! [`PatchApplier`], which returns a patched copy plus one provenance entry
//! per assignment.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use curator_rules::{PatchApplier, RuleSet};
//!
//! let rules = RuleSet::load_dir(Path::new("rules/"))?;
//! let applier = PatchApplier::new(&rules);
//! let outcome = applier.apply(&record);
//! ```
//!
//! ## Guarantees
//!
//! - Loading is fail-fast: one bad rule aborts the whole load.
//! - Directory loads sort files lexicographically by full path, so rule
//!   order is reproducible across loads.
//! - Application is single-pass in rule order against the accumulated
//!   record state, never mutates its input, and is safe to run concurrently
//!   over one shared `RuleSet`.

pub mod applier;
pub mod condition;
pub mod error;
pub mod loader;
pub mod patch;
pub mod validate;

pub use applier::{AppliedPatch, PatchApplier, PatchOutcome};
pub use condition::Condition;
pub use error::{RuleSetError, ValidationError};
pub use patch::{Patch, RuleSet};

// ── Tests ─────────────────────────────────────────────────────────────────────

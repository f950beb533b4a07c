//! Transformation run identity.

use serde::{Deserialize, Serialize};

/// Unique identifier for a single transformation run.
///
/// Every call to `Transformer::transform_record()` is one run, identified by
/// this UUID, which appears in the sealed run manifest alongside the source
/// fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Create a new, unique run ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

//! The sealed manifest identifying one transformation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use curator_contracts::{Record, RunId};

/// Compute the SHA-256 fingerprint of a source record.
///
/// The fingerprint commits to the record as received, before any phase
/// touches it: canonical JSON bytes (serde_json with no pretty-printing,
/// keys in input order) fed into SHA-256. Returns a lowercase 64-character
/// hex string.
///
/// # Panics
///
/// Panics if `record` cannot be serialized to JSON — which cannot happen
/// for a `Record` built from parsed JSON.
pub fn fingerprint(record: &Record) -> String {
    let bytes = serde_json::to_vec(record).expect("record must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

/// The sealed identity of one transformation run.
///
/// Produced once per `transform_record` call, after every phase has run.
/// Ties the output back to its input: `source_fingerprint` is the hash of
/// the record as received, so a reader can check that a stored output
/// really came from a given source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Unique identifier of this run.
    pub run_id: RunId,

    /// SHA-256 (hex) of the canonical JSON of the source record.
    pub source_fingerprint: String,

    /// Wall-clock time (UTC) the run finished.
    pub finalized_at: DateTime<Utc>,
}

impl RunManifest {
    /// Seal a manifest for a run over `source`, stamped with the current
    /// time and a fresh `RunId`.
    pub fn seal(source: &Record) -> Self {
        Self {
            run_id: RunId::new(),
            source_fingerprint: fingerprint(source),
            finalized_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use curator_contracts::Record;

    use super::{fingerprint, RunManifest};

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn fingerprint_is_64_hex_chars() {
        let fp = fingerprint(&record(&[("a", json!("1"))]));
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    /// Identical records fingerprint identically; any change to a value
    /// changes the fingerprint.
    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = record(&[("assay_type", json!("RNA-seq"))]);
        let b = record(&[("assay_type", json!("RNA-seq"))]);
        let c = record(&[("assay_type", json!("ATAC-seq"))]);

        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn seal_binds_the_source_fingerprint() {
        let source = record(&[("a", json!(1))]);
        let manifest = RunManifest::seal(&source);
        assert_eq!(manifest.source_fingerprint, fingerprint(&source));
    }

    #[test]
    fn sealed_runs_get_distinct_ids() {
        let source = Record::new();
        let first = RunManifest::seal(&source);
        let second = RunManifest::seal(&source);
        assert_ne!(first.run_id, second.run_id);
    }
}

//! Rule-set loading from JSON files on disk.
//!
//! Loading is fail-fast and read-only: the first malformed file or rule
//! aborts the whole load, so a caller can never observe a partially-loaded
//! rule set. Directory loads are deterministic: files are discovered
//! recursively and sorted lexicographically by full path before parsing,
//! so two loads of the same tree always produce the same rule order.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use curator_contracts::type_name;

use crate::error::RuleSetError;
use crate::patch::RuleSet;
use crate::validate::parse_patch;

impl RuleSet {
    /// Load every `*.json` file under `dir`, recursively.
    ///
    /// Files are parsed in lexicographic order of their full paths; rules
    /// within a file keep their array order. A directory containing no
    /// JSON files yields the empty rule set. A missing or non-directory
    /// path is an error.
    pub fn load_dir(dir: &Path) -> Result<RuleSet, RuleSetError> {
        if !dir.exists() {
            return Err(RuleSetError::NotFound {
                path: dir.to_path_buf(),
            });
        }
        if !dir.is_dir() {
            return Err(RuleSetError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        discover_json_files(dir, &mut files)?;
        files.sort();

        let mut set = RuleSet::empty();
        for file in &files {
            set = set.merge(Self::load_file(file)?);
        }

        info!(
            dir = %dir.display(),
            files = files.len(),
            rules = set.count(),
            "loaded rule set"
        );
        Ok(set)
    }

    /// Load a single rule file: a JSON array of rule objects.
    ///
    /// Every loaded rule records `path` as its `source_file`.
    pub fn load_file(path: &Path) -> Result<RuleSet, RuleSetError> {
        if !path.exists() {
            return Err(RuleSetError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(RuleSetError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| RuleSetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let raw: Value = serde_json::from_str(&contents).map_err(|e| RuleSetError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        let items = raw.as_array().ok_or_else(|| RuleSetError::NotAnArray {
            path: path.to_path_buf(),
            found: type_name(&raw),
        })?;

        let mut patches = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut patch = parse_patch(item, index).map_err(|e| RuleSetError::Invalid {
                path: path.to_path_buf(),
                source: e,
            })?;
            patch.source_file = Some(path.to_path_buf());
            patches.push(patch);
        }

        debug!(file = %path.display(), rules = patches.len(), "loaded rule file");
        Ok(RuleSet::new(patches))
    }
}

/// Collect every `*.json` file under `dir` into `out`, depth-first.
///
/// Order is not significant here; the caller sorts the full list.
fn discover_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RuleSetError> {
    let entries = std::fs::read_dir(dir).map_err(|e| RuleSetError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| RuleSetError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            discover_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

//! # curator-mapping
//!
//! Dictionary-driven renaming for the CURATOR pipeline: [`FieldMap`]
//! translates legacy field names to target names, [`ValueMap`] translates
//! legacy values per field. Both are loaded from JSON files, immutable
//! after loading, and total — an unknown name or value passes through
//! unchanged rather than erroring.

use std::path::{Path, PathBuf};

pub mod field;
pub mod value;

pub use field::FieldMap;
pub use value::ValueMap;

/// List every `*.json` file directly in `dir`, sorted lexicographically.
///
/// Not recursive: mapping dictionaries live flat in their directory.
/// Returns a plain reason string; callers wrap it in their own error
/// variant.
pub(crate) fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    if !dir.exists() {
        return Err(format!("mapping directory not found: {}", dir.display()));
    }
    if !dir.is_dir() {
        return Err(format!("mapping path is not a directory: {}", dir.display()));
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("failed to read mapping directory '{}': {e}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| format!("failed to read mapping directory '{}': {e}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::list_json_files;

    #[test]
    fn lists_only_top_level_json_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/d.json"), "{}").unwrap();

        let files = list_json_files(dir.path()).unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = list_json_files(&dir.path().join("absent")).unwrap_err();
        assert!(err.contains("not found"));
    }
}

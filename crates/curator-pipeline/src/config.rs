//! TOML pipeline configuration and fail-fast construction.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use curator_contracts::{CuratorError, CuratorResult};
use curator_mapping::{FieldMap, ValueMap};
use curator_rules::RuleSet;
use curator_schema::TargetSchema;

use crate::transformer::Transformer;

/// Where the pipeline's inputs live.
///
/// Example:
///
/// ```toml
/// schema_file = "config/target_schema.json"
/// field_mapping_file = "config/field_map.json"
/// value_mapping_dir = "config/value_maps"
/// patch_dir = "config/patches"
/// ```
///
/// `schema_file` is mandatory. Field mappings come from a single file or a
/// directory, not both. `patch_dir` and `patch_file` may be combined; the
/// file's rules apply after the directory's.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Single field-mapping dictionary file.
    pub field_mapping_file: Option<PathBuf>,

    /// Directory of field-mapping dictionary files, merged first-wins.
    pub field_mapping_dir: Option<PathBuf>,

    /// Directory of value-mapping dictionary files.
    pub value_mapping_dir: Option<PathBuf>,

    /// The target schema file.
    pub schema_file: PathBuf,

    /// Directory of rule files, loaded recursively in path order.
    pub patch_dir: Option<PathBuf>,

    /// Single rule file, applied after `patch_dir`'s rules.
    pub patch_file: Option<PathBuf>,
}

impl PipelineConfig {
    /// Parse `s` as TOML pipeline configuration.
    ///
    /// Returns `CuratorError::Config` if the TOML is malformed, misses
    /// `schema_file`, or names both field-mapping sources.
    pub fn from_toml_str(s: &str) -> CuratorResult<Self> {
        let config: PipelineConfig = toml::from_str(s).map_err(|e| CuratorError::Config {
            reason: format!("failed to parse pipeline TOML: {e}"),
        })?;
        if config.field_mapping_file.is_some() && config.field_mapping_dir.is_some() {
            return Err(CuratorError::Config {
                reason: "field_mapping_file and field_mapping_dir are mutually exclusive"
                    .to_string(),
            });
        }
        Ok(config)
    }

    /// Read the file at `path` and parse it as pipeline configuration.
    pub fn from_file(path: &Path) -> CuratorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CuratorError::Config {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load everything the configuration names and build a `Transformer`.
    ///
    /// Fail-fast: any load error aborts construction, so a transformer
    /// can never run against partially-loaded state. Unnamed sources load
    /// as empty — an absent `patch_dir` simply means no conditional
    /// patching.
    pub fn build(&self) -> CuratorResult<Transformer> {
        let mut rules = RuleSet::empty();
        if let Some(dir) = &self.patch_dir {
            rules = rules.merge(RuleSet::load_dir(dir)?);
        }
        if let Some(file) = &self.patch_file {
            rules = rules.merge(RuleSet::load_file(file)?);
        }

        let fields = match (&self.field_mapping_file, &self.field_mapping_dir) {
            (Some(file), _) => FieldMap::load_file(file)?,
            (None, Some(dir)) => FieldMap::load_dir(dir)?,
            (None, None) => FieldMap::empty(),
        };

        let values = match &self.value_mapping_dir {
            Some(dir) => ValueMap::load_dir(dir)?,
            None => ValueMap::empty(),
        };

        let schema = TargetSchema::load_file(&self.schema_file)?;

        info!(
            rules = rules.count(),
            field_mappings = fields.len(),
            value_fields = values.field_count(),
            schema_fields = schema.fields().len(),
            "pipeline built"
        );

        Ok(Transformer::new(rules, fields, values, schema))
    }
}

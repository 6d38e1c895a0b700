//! MergeService: orchestrates sources, applies merge policy, deserializes to ParleyConfig.

use crate::config::sources::{environment, global_file};
use crate::config::ParleyConfig;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::collections::HashMap;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources.
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(config_file: Option<&Path>) -> Result<ParleyConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = Self::add_explicit_file(builder, config_file);
        let builder = environment::add_to_builder(builder)?;
        Self::finish(builder)
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<ParleyConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = Self::add_explicit_file(builder, Some(path));
        let builder = environment::add_to_builder(builder)?;
        Self::finish(builder)
    }

    /// Load config from a specific file, overlaying the given variables
    /// instead of the process environment.
    pub fn load_with_vars(
        path: &Path,
        vars: HashMap<String, String>,
    ) -> Result<ParleyConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = Self::add_explicit_file(builder, Some(path));
        let builder = environment::add_vars_to_builder(builder, vars)?;
        Self::finish(builder)
    }

    fn add_explicit_file(
        builder: ConfigBuilder<DefaultState>,
        path: Option<&Path>,
    ) -> ConfigBuilder<DefaultState> {
        match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder,
        }
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<ParleyConfig, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

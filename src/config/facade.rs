//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::ParleyConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file, an optional explicit file, and environment.
    pub fn load(config_file: Option<&Path>) -> Result<ParleyConfig, ConfigError> {
        MergeService::load(config_file)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<ParleyConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> ParleyConfig {
        ParleyConfig::default()
    }
}

//! Merge policy: the lowest-precedence layer every load starts from.

use crate::config::ParleyConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with `ParleyConfig::default()`.
///
/// Arrays (`agents`, `handoffs`) from later sources replace rather than extend.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&ParleyConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}

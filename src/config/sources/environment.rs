//! Environment variable source: PARLEY_ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use std::collections::HashMap;

fn environment() -> Environment {
    Environment::with_prefix("PARLEY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Add environment variable overlay to builder.
/// `PARLEY_ORCHESTRATOR__MAX_TURNS=3` sets `orchestrator.max_turns`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(environment()))
}

/// Same overlay, reading from the given variables instead of the process environment.
pub fn add_vars_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: HashMap<String, String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(environment().source(Some(vars))))
}

//! Configuration
//!
//! Layered configuration: built-in defaults, the global config file, an
//! explicit config file, then `PARLEY_*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::agent::{validate_agent_config, AgentConfig};
use crate::error::ApiError;
use crate::handoff::HandoffRoute;
use crate::logging::LoggingConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::provider::ProviderConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Complete parley configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Agents registered at startup
    #[serde(default)]
    pub agents: Vec<AgentConfig>,

    /// Capability → target agent routes
    #[serde(default)]
    pub handoffs: Vec<HandoffRoute>,
}

impl ParleyConfig {
    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.orchestrator.max_turns < 1 {
            return Err(ApiError::ConfigError(
                "orchestrator.max_turns must be at least 1".to_string(),
            ));
        }

        self.provider.validate()?;

        for agent in &self.agents {
            validate_agent_config(agent)?;
        }

        for route in &self.handoffs {
            if route.capability.trim().is_empty() {
                return Err(ApiError::ConfigError(
                    "Handoff route with empty capability".to_string(),
                ));
            }
            if !self.agents.iter().any(|a| a.name == route.target) {
                // Runs that reach this route end with HandoffTargetMissing.
                warn!(
                    capability = %route.capability,
                    target = %route.target,
                    "Handoff route targets an undeclared agent"
                );
            }
        }

        Ok(())
    }
}

//! Declarative agent shape as it appears in configuration files.

use serde::{Deserialize, Serialize};

/// Agent configuration owned by the agent domain.
///
/// ```toml
/// [[agents]]
/// name = "Agent A"
/// instructions = "You are a helpful agent."
/// handoff_actions = ["transfer_to_agent_b"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique agent name.
    pub name: String,

    /// Behavioral directive handed to the provider as the system message.
    pub instructions: String,

    /// Capability identifiers the agent may invoke to nominate the next speaker.
    #[serde(default)]
    pub handoff_actions: Vec<String>,
}

//! Agent command service: single entry point per agent CLI command variant.
//!
//! CLI parses, calls one method per variant, and formats output.

use crate::agent::registry::AgentRegistry;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub struct AgentCommandService;

/// Result of agent list command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentListResult {
    pub agents: Vec<AgentListItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentListItem {
    pub name: String,
    pub handoff_actions: Vec<String>,
}

/// Result of agent show command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentShowResult {
    pub name: String,
    pub instructions: String,
    pub handoff_actions: Vec<String>,
}

impl AgentCommandService {
    /// List agents in registry order.
    pub fn list(registry: &AgentRegistry) -> AgentListResult {
        let agents = registry
            .list()
            .iter()
            .map(|a| AgentListItem {
                name: a.name.clone(),
                handoff_actions: a.handoff_actions.iter().cloned().collect(),
            })
            .collect();
        AgentListResult { agents }
    }

    /// Show one agent.
    pub fn show(registry: &AgentRegistry, name: &str) -> Result<AgentShowResult, ApiError> {
        let agent = registry.get_or_error(name)?;
        Ok(AgentShowResult {
            name: agent.name.clone(),
            instructions: agent.instructions.clone(),
            handoff_actions: agent.handoff_actions.iter().cloned().collect(),
        })
    }
}

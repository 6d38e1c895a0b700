//! Agent validation owned by the agent domain.

use super::config::AgentConfig;
use crate::error::ApiError;

/// Validate an agent name. Whitespace-only names count as empty.
pub fn validate_agent_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::EmptyName);
    }
    Ok(())
}

/// Validate a declared agent before it is registered.
pub fn validate_agent_config(agent: &AgentConfig) -> Result<(), ApiError> {
    validate_agent_name(&agent.name)?;

    if let Some(action) = agent.handoff_actions.iter().find(|a| a.trim().is_empty()) {
        return Err(ApiError::ConfigError(format!(
            "Agent '{}' declares an empty handoff action {:?}",
            agent.name, action
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_names_are_empty() {
        assert!(matches!(validate_agent_name(""), Err(ApiError::EmptyName)));
        assert!(matches!(validate_agent_name("   "), Err(ApiError::EmptyName)));
        assert!(validate_agent_name("Agent A").is_ok());
    }

    #[test]
    fn test_empty_handoff_action_rejected() {
        let agent = AgentConfig {
            name: "A".to_string(),
            instructions: "You are helpful.".to_string(),
            handoff_actions: vec!["transfer".to_string(), " ".to_string()],
        };
        assert!(matches!(
            validate_agent_config(&agent),
            Err(ApiError::ConfigError(_))
        ));
    }
}

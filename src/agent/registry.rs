//! Agent registry and agent spec types.

use crate::agent::domain::{validate_agent_config, validate_agent_name};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A named behavioral directive plus the handoff capabilities it may invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique name within a registry
    pub name: String,
    /// Instruction string handed to the provider
    pub instructions: String,
    /// Capability identifiers resolved through the host's handoff table
    #[serde(default)]
    pub handoff_actions: BTreeSet<String>,
}

impl AgentSpec {
    /// Create a spec with no handoff actions
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            handoff_actions: BTreeSet::new(),
        }
    }

    /// Add a handoff capability identifier
    pub fn with_handoff_action(mut self, action: impl Into<String>) -> Self {
        self.handoff_actions.insert(action.into());
        self
    }

    /// Check whether the agent exposes the given capability
    pub fn exposes(&self, action: &str) -> bool {
        self.handoff_actions.contains(action)
    }
}

/// Agent registry for managing agent specs
///
/// Entries are shared immutable snapshots. `update` installs a fresh snapshot,
/// so sessions that already hold the previous `Arc` keep seeing it.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<AgentSpec>>,
    order: Vec<String>,
}

impl AgentRegistry {
    /// Create a new empty agent registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent with the given name and instructions
    pub fn add(
        &mut self,
        name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Result<Arc<AgentSpec>, ApiError> {
        self.add_spec(AgentSpec::new(name, instructions))
    }

    /// Add a fully built spec. Fails without side effects on an empty or taken name.
    pub fn add_spec(&mut self, spec: AgentSpec) -> Result<Arc<AgentSpec>, ApiError> {
        validate_agent_name(&spec.name)?;
        if self.agents.contains_key(&spec.name) {
            return Err(ApiError::DuplicateName(spec.name));
        }

        let spec = Arc::new(spec);
        self.order.push(spec.name.clone());
        self.agents.insert(spec.name.clone(), spec.clone());
        info!(agent = %spec.name, "Agent added");
        Ok(spec)
    }

    /// Replace an agent's instructions
    pub fn update(&mut self, name: &str, instructions: impl Into<String>) -> Result<(), ApiError> {
        let Some(current) = self.agents.get_mut(name) else {
            warn!(agent = name, "Update of unknown agent ignored");
            return Err(ApiError::NotFound(name.to_string()));
        };

        let mut next = current.as_ref().clone();
        next.instructions = instructions.into();
        *current = Arc::new(next);
        info!(agent = name, "Agent instructions updated");
        Ok(())
    }

    /// Remove an agent from the registry
    pub fn delete(&mut self, name: &str) -> Result<(), ApiError> {
        if self.agents.remove(name).is_none() {
            warn!(agent = name, "Delete of unknown agent ignored");
            return Err(ApiError::NotFound(name.to_string()));
        }
        self.order.retain(|n| n != name);
        info!(agent = name, "Agent deleted");
        Ok(())
    }

    /// Get an agent spec by name
    pub fn get(&self, name: &str) -> Option<Arc<AgentSpec>> {
        self.agents.get(name).cloned()
    }

    /// Get an agent spec by name or return an error
    pub fn get_or_error(&self, name: &str) -> Result<Arc<AgentSpec>, ApiError> {
        self.get(name)
            .ok_or_else(|| ApiError::NotFound(name.to_string()))
    }

    /// All agents in insertion order
    pub fn list(&self) -> Vec<Arc<AgentSpec>> {
        self.order
            .iter()
            .filter_map(|name| self.agents.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Resolve participant names to spec snapshots, in the given order.
    ///
    /// The same agent may not be selected twice.
    pub fn select(&self, names: &[String]) -> Result<Vec<Arc<AgentSpec>>, ApiError> {
        let mut selected: Vec<Arc<AgentSpec>> = Vec::with_capacity(names.len());
        for name in names {
            if selected.iter().any(|s| &s.name == name) {
                return Err(ApiError::DuplicateName(name.clone()));
            }
            selected.push(self.get_or_error(name)?);
        }
        Ok(selected)
    }

    /// Load agents declared in configuration
    pub fn load_from_config(
        &mut self,
        config: &crate::config::ParleyConfig,
    ) -> Result<(), ApiError> {
        for agent_config in &config.agents {
            validate_agent_config(agent_config)?;
            let mut spec = AgentSpec::new(
                agent_config.name.clone(),
                agent_config.instructions.clone(),
            );
            spec.handoff_actions
                .extend(agent_config.handoff_actions.iter().cloned());
            self.add_spec(spec)?;
        }
        debug!(count = self.len(), "Agents loaded from config");
        Ok(())
    }
}

//! Handoff capability resolution.
//!
//! Agents declare capability identifiers (`handoff_actions`). When a provider
//! reports that one was invoked during a turn, the orchestrator resolves it to
//! the next speaker through a host-supplied [`HandoffTable`]. The set of
//! identifiers is closed: nothing submitted by a caller is ever executed.

use crate::agent::AgentSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One capability → target agent mapping, as declared in configuration.
///
/// ```toml
/// [[handoffs]]
/// capability = "transfer_to_agent_b"
/// target = "Agent B"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffRoute {
    pub capability: String,
    pub target: String,
}

/// Lookup table from capability identifier to target agent name.
#[derive(Debug, Clone, Default)]
pub struct HandoffTable {
    routes: HashMap<String, String>,
}

impl HandoffTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from declared routes. Later routes win on a repeated capability.
    pub fn from_routes(routes: &[HandoffRoute]) -> Self {
        let mut table = Self::new();
        for route in routes {
            table.insert(route.capability.clone(), route.target.clone());
        }
        table
    }

    pub fn with_route(mut self, capability: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(capability, target);
        self
    }

    pub fn insert(&mut self, capability: impl Into<String>, target: impl Into<String>) {
        self.routes.insert(capability.into(), target.into());
    }

    /// Target agent name for a capability invoked by `agent`.
    ///
    /// Returns `None` when the agent does not expose the capability or the
    /// table has no route for it.
    pub fn resolve(&self, agent: &AgentSpec, capability: &str) -> Option<&str> {
        if !agent.exposes(capability) {
            return None;
        }
        self.routes.get(capability).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

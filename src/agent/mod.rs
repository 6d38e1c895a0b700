//! Agent Registry Model
//!
//! Named agent specifications (a name, an instruction string and the handoff
//! capabilities the agent may invoke) and the registry that owns them.
//! Sessions hold shared snapshots of these specs, never live lookups.

pub mod commands;
pub mod domain;
mod registry;

pub use commands::{AgentCommandService, AgentListItem, AgentListResult, AgentShowResult};
pub use domain::{validate_agent_config, validate_agent_name, AgentConfig};
pub use registry::{AgentRegistry, AgentSpec};

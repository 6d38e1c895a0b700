//! Parley: turn-based multi-agent conversations
//!
//! Named agents (a name plus an instruction string) take turns answering one
//! another through a completion provider. The [`orchestrator`] drives a
//! [`session`] until a termination condition; the [`transcript`] module
//! projects the result for display and export.

pub mod agent;
pub mod config;
pub mod error;
pub mod handoff;
pub mod logging;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod tooling;
pub mod transcript;

pub use agent::{AgentRegistry, AgentSpec};
pub use error::ApiError;
pub use handoff::HandoffTable;
pub use orchestrator::{CancellationHandle, HandoffOrchestrator, RunSummary, TerminationPolicy};
pub use provider::{CompletionProvider, ProviderMessage, ProviderResponse};
pub use session::{ConversationEntry, ConversationSession, SessionStatus, Speaker, TerminationReason};
pub use transcript::{TranscriptLine, TranscriptLog};

//! Completion Provider
//!
//! The orchestrator's only external collaborator. A provider receives the
//! speaking agent and the full transcript on every call (it keeps no state
//! between calls) and returns the messages it produced. The orchestrator reads
//! only the last message's content, plus the handoff capability the provider
//! reports having invoked, if any.

pub mod clients;
pub mod profile;

use crate::agent::AgentSpec;
use crate::error::ApiError;
use crate::session::ConversationEntry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use clients::OpenAiCompatibleClient;
pub use profile::{ProviderConfig, ProviderType};

/// Per-request generation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// One message produced during a provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub content: String,
}

/// Result of one provider call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    pub messages: Vec<ProviderMessage>,
    /// Capability identifier the provider invoked during the call
    pub handoff: Option<String>,
}

impl ProviderResponse {
    /// Response consisting of a single message
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            messages: vec![ProviderMessage {
                content: content.into(),
            }],
            handoff: None,
        }
    }

    pub fn with_handoff(mut self, capability: impl Into<String>) -> Self {
        self.handoff = Some(capability.into());
        self
    }

    /// Content of the last produced message
    pub fn last_content(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

/// Produces an agent's next message from the transcript so far.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn run(
        &self,
        agent: &AgentSpec,
        transcript: &[ConversationEntry],
    ) -> Result<ProviderResponse, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_content_reads_final_message() {
        let response = ProviderResponse {
            messages: vec![
                ProviderMessage {
                    content: "draft".to_string(),
                },
                ProviderMessage {
                    content: "final".to_string(),
                },
            ],
            handoff: None,
        };
        assert_eq!(response.last_content(), Some("final"));
        assert_eq!(ProviderResponse::default().last_content(), None);
    }
}

//! Scripted completion provider shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parley::agent::AgentSpec;
use parley::error::ApiError;
use parley::provider::{CompletionProvider, ProviderResponse};
use parley::session::ConversationEntry;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// What the provider does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Handoff(String, String),
    Fail(String),
    Empty,
    Slow(Duration, String),
}

pub fn reply(content: &str) -> Step {
    Step::Reply(content.to_string())
}

pub fn handoff(content: &str, capability: &str) -> Step {
    Step::Handoff(content.to_string(), capability.to_string())
}

pub fn fail(message: &str) -> Step {
    Step::Fail(message.to_string())
}

/// One observed provider call.
#[derive(Debug, Clone)]
pub struct Call {
    pub agent: String,
    pub instructions: String,
    pub transcript_len: usize,
}

/// Replays a fixed script; once exhausted, answers `"<agent> says hello"`.
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn run(
        &self,
        agent: &AgentSpec,
        transcript: &[ConversationEntry],
    ) -> Result<ProviderResponse, ApiError> {
        self.calls.lock().unwrap().push(Call {
            agent: agent.name.clone(),
            instructions: agent.instructions.clone(),
            transcript_len: transcript.len(),
        });

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            None => Ok(ProviderResponse::text(format!("{} says hello", agent.name))),
            Some(Step::Reply(content)) => Ok(ProviderResponse::text(content)),
            Some(Step::Handoff(content, capability)) => {
                Ok(ProviderResponse::text(content).with_handoff(capability))
            }
            Some(Step::Fail(message)) => Err(ApiError::ProviderRequestFailed(message)),
            Some(Step::Empty) => Ok(ProviderResponse::default()),
            Some(Step::Slow(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(ProviderResponse::text(content))
            }
        }
    }
}

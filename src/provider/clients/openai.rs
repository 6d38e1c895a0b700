//! Chat-completions client usable against OpenAI, Ollama and other
//! OpenAI-compatible endpoints.
//!
//! The agent's instructions become the system message, user entries become
//! `user` messages and agent entries become `assistant` messages carrying the
//! speaking agent's name. Each handoff action is offered as a function tool;
//! a returned tool call is reported back as the invoked capability.

use crate::agent::AgentSpec;
use crate::error::ApiError;
use crate::provider::{CompletionOptions, CompletionProvider, ProviderMessage, ProviderResponse};
use crate::session::{ConversationEntry, Speaker};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    options: CompletionOptions,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: ToolFunction,
}

#[derive(Debug, Deserialize)]
struct ToolFunction {
    name: String,
}

const MAX_NAME_LEN: usize = 64;

/// The `name` field only accepts `[A-Za-z0-9_-]{1,64}`.
fn message_name(agent_name: &str) -> String {
    agent_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .take(MAX_NAME_LEN)
        .collect()
}

/// Wire names for the transcript's agents. Agents whose names collapse to
/// the same wire name get none, so the provider never conflates them.
fn message_names(transcript: &[ConversationEntry]) -> HashMap<&str, Option<String>> {
    let mut by_wire: HashMap<String, BTreeSet<&str>> = HashMap::new();
    for entry in transcript {
        if let Speaker::Agent(name) = &entry.speaker {
            by_wire.entry(message_name(name)).or_default().insert(name.as_str());
        }
    }

    let mut names = HashMap::new();
    for (wire, agents) in by_wire {
        let unique = agents.len() == 1 && !wire.is_empty();
        for agent in agents {
            names.insert(agent, unique.then(|| wire.clone()));
        }
    }
    names
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        options: CompletionOptions,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            options,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(
        &'a self,
        agent: &AgentSpec,
        transcript: &[ConversationEntry],
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ChatMessage {
            role: "system",
            content: agent.instructions.clone(),
            name: None,
        });
        let names = message_names(transcript);
        for entry in transcript {
            messages.push(match &entry.speaker {
                Speaker::User => ChatMessage {
                    role: "user",
                    content: entry.content.clone(),
                    name: None,
                },
                Speaker::Agent(name) => ChatMessage {
                    role: "assistant",
                    content: entry.content.clone(),
                    name: names.get(name.as_str()).cloned().flatten(),
                },
            });
        }

        let tools = agent
            .handoff_actions
            .iter()
            .map(|action| {
                json!({
                    "type": "function",
                    "function": {
                        "name": action,
                        "description": format!("Hand the conversation over ({})", action),
                        "parameters": { "type": "object", "properties": {} }
                    }
                })
            })
            .collect();

        ChatRequest {
            model: &self.model,
            messages,
            tools,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        }
    }

    fn parse_response(body: ChatResponse) -> Result<ProviderResponse, ApiError> {
        let mut response = ProviderResponse::default();
        for choice in body.choices {
            if response.handoff.is_none() {
                response.handoff = choice
                    .message
                    .tool_calls
                    .first()
                    .map(|call| call.function.name.clone());
            }
            if let Some(content) = choice.message.content {
                response.messages.push(ProviderMessage { content });
            }
        }

        if response.messages.is_empty() {
            if response.handoff.is_none() {
                return Err(ApiError::ProviderError(
                    "Response contained no message content".to_string(),
                ));
            }
            // A bare tool call still counts as the agent's turn.
            response.messages.push(ProviderMessage {
                content: String::new(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleClient {
    async fn run(
        &self,
        agent: &AgentSpec,
        transcript: &[ConversationEntry],
    ) -> Result<ProviderResponse, ApiError> {
        let request = self.build_request(agent, transcript);
        debug!(
            agent = %agent.name,
            model = %self.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let mut builder = self.http.post(self.completions_url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::ProviderRequestFailed(format!(
                "{} returned {}: {}",
                self.completions_url(),
                status,
                body
            )));
        }

        let body: ChatResponse = response.json().await?;
        Self::parse_response(body)
    }
}

//! Handoff Orchestrator
//!
//! Drives a running [`ConversationSession`] turn by turn: the active agent is
//! asked for its next message with the whole transcript as context, the reply
//! is appended, and the run stops on the termination keyword, a provider
//! failure, an unresolvable handoff, cancellation, or when `max_turns` agent
//! turns have completed. Provider failures are never retried; the transcript
//! up to the last successful turn is kept as is.

use crate::agent::AgentSpec;
use crate::error::ApiError;
use crate::handoff::HandoffTable;
use crate::provider::{CompletionProvider, ProviderResponse};
use crate::session::{ConversationEntry, ConversationSession, Speaker, TerminationReason};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Orchestrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Default upper bound on agent turns per run
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Stop the run when a reply contains `keyword`
    #[serde(default = "default_true")]
    pub stop_on_keyword: bool,

    #[serde(default = "default_keyword")]
    pub keyword: String,

    #[serde(default)]
    pub case_sensitive: bool,

    /// Per-turn provider deadline; a timeout counts as a provider failure
    #[serde(default)]
    pub turn_timeout_ms: Option<u64>,
}

fn default_max_turns() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_keyword() -> String {
    "goodbye".to_string()
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            stop_on_keyword: default_true(),
            keyword: default_keyword(),
            case_sensitive: false,
            turn_timeout_ms: None,
        }
    }
}

/// When a reply ends the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// Plain substring test on the reply. Incidental matches also terminate.
    Keyword { keyword: String, case_sensitive: bool },
    Disabled,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        TerminationPolicy::Keyword {
            keyword: default_keyword(),
            case_sensitive: false,
        }
    }
}

impl TerminationPolicy {
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        if !config.stop_on_keyword || config.keyword.is_empty() {
            return TerminationPolicy::Disabled;
        }
        TerminationPolicy::Keyword {
            keyword: config.keyword.clone(),
            case_sensitive: config.case_sensitive,
        }
    }

    pub fn should_terminate(&self, content: &str) -> bool {
        match self {
            TerminationPolicy::Keyword {
                keyword,
                case_sensitive: true,
            } => content.contains(keyword.as_str()),
            TerminationPolicy::Keyword {
                keyword,
                case_sensitive: false,
            } => content
                .to_lowercase()
                .contains(keyword.to_lowercase().as_str()),
            TerminationPolicy::Disabled => false,
        }
    }
}

/// Coarse-grained cancellation: checked before each turn, never mid-call.
/// Each run starts un-cancelled, so a cancel only ends the run in progress.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn rearm(&self) {
        if self.cancelled.swap(false, Ordering::SeqCst) {
            debug!("Cleared cancellation left over from a previous run");
        }
    }
}

/// Notified with each agent entry right after it is appended.
pub trait TurnObserver {
    fn on_turn(&mut self, entry: &ConversationEntry);
}

impl<F> TurnObserver for F
where
    F: FnMut(&ConversationEntry),
{
    fn on_turn(&mut self, entry: &ConversationEntry) {
        self(entry)
    }
}

/// Outcome of one orchestrated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub turns: usize,
    pub reason: TerminationReason,
}

pub struct HandoffOrchestrator {
    provider: Arc<dyn CompletionProvider>,
    handoffs: HandoffTable,
    policy: TerminationPolicy,
    turn_timeout: Option<Duration>,
    cancellation: CancellationHandle,
}

impl HandoffOrchestrator {
    /// Orchestrator with the default keyword policy and no handoff routes
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            handoffs: HandoffTable::new(),
            policy: TerminationPolicy::default(),
            turn_timeout: None,
            cancellation: CancellationHandle::new(),
        }
    }

    pub fn from_config(
        provider: Arc<dyn CompletionProvider>,
        config: &crate::config::ParleyConfig,
    ) -> Self {
        Self::new(provider)
            .with_handoffs(HandoffTable::from_routes(&config.handoffs))
            .with_policy(TerminationPolicy::from_config(&config.orchestrator))
            .with_turn_timeout(config.orchestrator.turn_timeout_ms.map(Duration::from_millis))
    }

    pub fn with_handoffs(mut self, handoffs: HandoffTable) -> Self {
        self.handoffs = handoffs;
        self
    }

    pub fn with_policy(mut self, policy: TerminationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Handle that cancels this orchestrator's runs before their next turn
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// Drive a running session to a terminal state.
    pub async fn run(&self, session: &mut ConversationSession) -> Result<RunSummary, ApiError> {
        self.run_with_observer(session, |_: &ConversationEntry| {})
            .await
    }

    /// Drive a running session to a terminal state, reporting each turn.
    ///
    /// Only a session that is not `Running` is an error; every in-run failure
    /// ends up as the session's termination reason instead.
    pub async fn run_with_observer<O: TurnObserver>(
        &self,
        session: &mut ConversationSession,
        mut observer: O,
    ) -> Result<RunSummary, ApiError> {
        if !session.is_running() {
            return Err(ApiError::SessionNotRunning(session.status().to_string()));
        }
        self.cancellation.rearm();

        info!(
            participants = session.participants().len(),
            max_turns = session.max_turns(),
            "Starting conversation run"
        );

        let reason = loop {
            if session.turn_count() >= session.max_turns() {
                break TerminationReason::MaxTurnsReached;
            }
            if self.cancellation.is_cancelled() {
                break TerminationReason::Cancelled;
            }

            let agent = session.participants()[session.active_speaker_index()].clone();
            let response = match self.call_provider(&agent, session.transcript()).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(agent = %agent.name, turn = session.turn_count() + 1, error = %e, "Provider call failed");
                    break TerminationReason::ProviderError {
                        message: e.to_string(),
                    };
                }
            };

            let Some(content) = response.last_content().map(str::to_string) else {
                warn!(agent = %agent.name, "Provider returned no messages");
                break TerminationReason::ProviderError {
                    message: "provider returned no messages".to_string(),
                };
            };

            let keyword_hit = self.policy.should_terminate(&content);
            session.append(Speaker::Agent(agent.name.clone()), content)?;
            session.record_turn();
            if let Some(entry) = session.transcript().last() {
                observer.on_turn(entry);
            }
            debug!(
                agent = %agent.name,
                turn = session.turn_count(),
                handoff = ?response.handoff,
                "Turn completed"
            );

            if keyword_hit {
                break TerminationReason::KeywordDetected;
            }

            match response.handoff.as_deref() {
                Some(capability) => match self.resolve_handoff(session, &agent, capability) {
                    Ok(index) => session.set_active_speaker(index),
                    Err(target) => {
                        warn!(agent = %agent.name, capability, target = %target, "Handoff target missing");
                        break TerminationReason::HandoffTargetMissing { target };
                    }
                },
                None => session.advance_speaker(),
            }
        };

        session.terminate(reason.clone());
        info!(turns = session.turn_count(), reason = %reason, "Conversation run finished");

        Ok(RunSummary {
            turns: session.turn_count(),
            reason,
        })
    }

    async fn call_provider(
        &self,
        agent: &AgentSpec,
        transcript: &[ConversationEntry],
    ) -> Result<ProviderResponse, ApiError> {
        let call = self.provider.run(agent, transcript);
        match self.turn_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ApiError::ProviderError(format!("no response within {}ms", limit.as_millis()))
            })?,
            None => call.await,
        }
    }

    /// Participant index nominated by `capability`, or the unresolvable target.
    fn resolve_handoff(
        &self,
        session: &ConversationSession,
        agent: &AgentSpec,
        capability: &str,
    ) -> Result<usize, String> {
        let target = self
            .handoffs
            .resolve(agent, capability)
            .ok_or_else(|| capability.to_string())?;
        session
            .participant_index(target)
            .ok_or_else(|| target.to_string())
    }
}

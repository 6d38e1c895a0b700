//! Conversation Session
//!
//! Mutable state of one orchestrated run: the participants, the append-only
//! transcript, whose turn is next, and how the run ended.

use crate::agent::AgentSpec;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Author of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent(String),
}

impl Speaker {
    pub fn as_str(&self) -> &str {
        match self {
            Speaker::User => "user",
            Speaker::Agent(name) => name,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Speaker::User)
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub content: String,
    /// Strictly increasing within a session, 0 for the opening user message
    pub sequence: u64,
    /// Wall-clock time the entry was recorded
    pub timestamp: DateTime<Utc>,
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TerminationReason {
    MaxTurnsReached,
    KeywordDetected,
    ProviderError { message: String },
    HandoffTargetMissing { target: String },
    Cancelled,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::MaxTurnsReached => write!(f, "max turns reached"),
            TerminationReason::KeywordDetected => write!(f, "termination keyword detected"),
            TerminationReason::ProviderError { message } => write!(f, "provider error: {}", message),
            TerminationReason::HandoffTargetMissing { target } => {
                write!(f, "handoff target missing: {}", target)
            }
            TerminationReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Lifecycle of a session. `Terminated` is absorbing until `reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Running,
    Terminated(TerminationReason),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Terminated(reason) => write!(f, "terminated ({})", reason),
        }
    }
}

/// State of one conversation run.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    participants: Vec<Arc<AgentSpec>>,
    transcript: Vec<ConversationEntry>,
    active_speaker_index: usize,
    turn_count: usize,
    max_turns: usize,
    status: SessionStatus,
    next_sequence: u64,
}

impl ConversationSession {
    /// Create an idle session with an empty transcript
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
            transcript: Vec::new(),
            active_speaker_index: 0,
            turn_count: 0,
            max_turns: 0,
            status: SessionStatus::Idle,
            next_sequence: 0,
        }
    }

    /// Begin a run. Leaves the session untouched if the inputs are rejected.
    pub fn start(
        &mut self,
        participants: Vec<Arc<AgentSpec>>,
        max_turns: usize,
        initial_message: impl Into<String>,
    ) -> Result<(), ApiError> {
        if participants.len() < 2 {
            return Err(ApiError::InsufficientParticipants(participants.len()));
        }
        if max_turns < 1 {
            return Err(ApiError::InvalidMaxTurns(max_turns));
        }

        self.reset();
        self.participants = participants;
        self.max_turns = max_turns;
        self.status = SessionStatus::Running;
        self.append(Speaker::User, initial_message.into())?;
        Ok(())
    }

    /// Clear transcript and counters and return to `Idle`
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.active_speaker_index = 0;
        self.turn_count = 0;
        self.next_sequence = 0;
        self.status = SessionStatus::Idle;
    }

    /// Record an entry, assigning its sequence number and timestamp
    pub(crate) fn append(
        &mut self,
        speaker: Speaker,
        content: String,
    ) -> Result<&ConversationEntry, ApiError> {
        if !self.is_running() {
            return Err(ApiError::SessionNotRunning(self.status.to_string()));
        }

        let entry = ConversationEntry {
            speaker,
            content,
            sequence: self.next_sequence,
            timestamp: Utc::now(),
        };
        self.next_sequence += 1;
        self.transcript.push(entry);
        Ok(&self.transcript[self.transcript.len() - 1])
    }

    pub(crate) fn record_turn(&mut self) {
        self.turn_count += 1;
    }

    pub(crate) fn set_active_speaker(&mut self, index: usize) {
        self.active_speaker_index = index;
    }

    /// Round-robin successor of the active speaker
    pub(crate) fn advance_speaker(&mut self) {
        self.active_speaker_index = (self.active_speaker_index + 1) % self.participants.len();
    }

    pub(crate) fn terminate(&mut self, reason: TerminationReason) {
        self.status = SessionStatus::Terminated(reason);
    }

    pub fn participants(&self) -> &[Arc<AgentSpec>] {
        &self.participants
    }

    /// Position of a participant by name
    pub fn participant_index(&self, name: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.name == name)
    }

    pub fn transcript(&self) -> &[ConversationEntry] {
        &self.transcript
    }

    pub fn active_speaker_index(&self) -> usize {
        self.active_speaker_index
    }

    /// The agent whose turn is next, if the session has participants
    pub fn active_speaker(&self) -> Option<&Arc<AgentSpec>> {
        self.participants.get(self.active_speaker_index)
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Termination reason, once the run has ended
    pub fn termination_reason(&self) -> Option<&TerminationReason> {
        match &self.status {
            SessionStatus::Terminated(reason) => Some(reason),
            _ => None,
        }
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

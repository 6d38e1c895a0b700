//! Transcript Log
//!
//! Read-side projections of a session's transcript for display and export.
//! Everything here is derived from the transcript alone.

use crate::session::ConversationSession;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One displayable transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptLine {
    pub speaker: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptLine {
    /// `[HH:MM:SS] speaker: content`
    pub fn export_line(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.speaker,
            self.content
        )
    }
}

pub struct TranscriptLog;

impl TranscriptLog {
    /// Project the transcript into display lines
    pub fn render(session: &ConversationSession) -> Vec<TranscriptLine> {
        session
            .transcript()
            .iter()
            .map(|entry| TranscriptLine {
                speaker: entry.speaker.to_string(),
                content: entry.content.clone(),
                timestamp: entry.timestamp,
            })
            .collect()
    }

    /// Flatten the transcript into the export format, one line per entry
    pub fn serialize(session: &ConversationSession) -> String {
        Self::render(session)
            .iter()
            .map(TranscriptLine::export_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Machine-readable projection: status plus full entries
    pub fn to_json(session: &ConversationSession) -> serde_json::Value {
        serde_json::json!({
            "status": session.status(),
            "turns": session.turn_count(),
            "max_turns": session.max_turns(),
            "transcript": session.transcript(),
        })
    }
}

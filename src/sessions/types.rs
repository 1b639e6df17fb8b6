use crate::chat::Conversation;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Session identifier: creation time in milliseconds, bumped to stay unique
pub type SessionId = i64;

/// A saved conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique, creation-ordered identifier
    pub id: SessionId,
    /// Display title derived from the creation time
    pub title: String,
    /// Last synced snapshot of the conversation
    pub messages: Conversation,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Number of turns in the stored snapshot
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Listing entry for a saved session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session id
    pub id: SessionId,
    /// Display title
    pub title: String,
    /// Number of stored turns, greeting included
    pub message_count: usize,
    /// Most recent question asked in the session
    pub last_question: Option<String>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            title: session.title.clone(),
            message_count: session.message_count(),
            last_question: session
                .messages
                .turns()
                .iter()
                .rev()
                .find(|turn| turn.is_user())
                .map(|turn| turn.text.clone()),
            created_at: session.created_at,
        }
    }
}

/// Result of deleting a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No session had that id
    NotFound,
    /// A non-current session was removed
    Deleted,
    /// The current session was removed; the conversation is scratch again
    DeletedCurrent,
}

/// Human-readable session title for a creation time
pub fn title_for(created_at: DateTime<Utc>) -> String {
    format!(
        "Chat {}",
        created_at.with_timezone(&Local).format("%b %-d, %Y %H:%M")
    )
}

//! Message store for the active conversation
//!
//! A conversation is an append-only log of turns. Turn ids are assigned
//! monotonically and never reused, and every fresh conversation starts with
//! the bot greeting at id 0. Expansion and search never mutate the log; the
//! only in-place edit is attaching expanded text to an existing bot turn.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Greeting shown as the first turn of every fresh conversation
pub const GREETING: &str =
    "Hi! I\u{2019}m the UNC Dorm Guide. Tell me what you\u{2019}re looking for in a dorm.";

/// Markers the service places in a reply it cut short
const TRUNCATION_MARKERS: &[&str] = &["\u{2026}", "...", "[more]"];

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person chatting
    User,
    /// The recommendation service (or a local fallback reply)
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A single chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    /// Position-independent id, unique within its conversation
    pub id: u64,
    /// Who produced the turn
    pub sender: Sender,
    /// Primary (possibly truncated) content
    pub text: String,
    /// Expanded content, bot turns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    /// Explicit truncation signal reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

impl Turn {
    /// Whether the turn was authored by the user
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Whether the turn was authored by the bot
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }

    /// Whether this bot turn should offer a "show more" control
    ///
    /// The service's explicit flag wins; the text markers are only consulted
    /// when the reply carried no flag (older services, restored sessions).
    ///
    /// # Examples
    ///
    /// ```
    /// use dormguide::chat::Conversation;
    ///
    /// let mut conversation = Conversation::new();
    /// conversation.append_user_turn("Quiet dorm?");
    /// let id = conversation.append_bot_turn("Cobb is quiet\u{2026}").unwrap();
    /// assert!(conversation.get(id).unwrap().is_truncated());
    /// ```
    pub fn is_truncated(&self) -> bool {
        if !self.is_bot() {
            return false;
        }
        match self.truncated {
            Some(flag) => flag,
            None => text_signals_truncation(&self.text),
        }
    }
}

/// Text predicate used when the service sent no explicit truncation flag
pub fn text_signals_truncation(text: &str) -> bool {
    TRUNCATION_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Ordered log of turns for one conversation
///
/// Serializes as a plain JSON array of turns so session snapshots stay
/// readable in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Creates a fresh conversation holding only the greeting
    ///
    /// # Examples
    ///
    /// ```
    /// use dormguide::chat::{Conversation, Sender, GREETING};
    ///
    /// let conversation = Conversation::new();
    /// assert_eq!(conversation.len(), 1);
    /// assert_eq!(conversation.turns()[0].id, 0);
    /// assert_eq!(conversation.turns()[0].sender, Sender::Bot);
    /// assert_eq!(conversation.turns()[0].text, GREETING);
    /// ```
    pub fn new() -> Self {
        let mut conversation = Self { turns: Vec::new() };
        conversation.replace_greeting();
        conversation
    }

    /// Rebuilds a conversation from stored turns
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Resets the log to exactly one greeting turn with id 0
    pub fn replace_greeting(&mut self) {
        self.turns.clear();
        self.turns.push(Turn {
            id: 0,
            sender: Sender::Bot,
            text: GREETING.to_string(),
            full_text: None,
            truncated: None,
        });
    }

    /// Appends a user turn holding the trimmed input
    ///
    /// Returns the assigned id, or `None` when the trimmed input is empty
    /// or no turn id is left (nothing is appended).
    pub fn append_user_turn(&mut self, text: &str) -> Option<u64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let id = self.next_id()?;
        self.turns.push(Turn {
            id,
            sender: Sender::User,
            text: trimmed.to_string(),
            full_text: None,
            truncated: None,
        });
        Some(id)
    }

    /// Appends a bot turn whose expanded text starts out equal to its text
    pub fn append_bot_turn(&mut self, text: impl Into<String>) -> Option<u64> {
        self.push_bot_turn(text.into(), None)
    }

    /// Appends a bot turn carrying the service's truncation flag
    ///
    /// Returns `None` (nothing is appended) once the turn ids are used up,
    /// which only restored data can cause.
    pub fn append_bot_reply(
        &mut self,
        text: impl Into<String>,
        truncated: Option<bool>,
    ) -> Option<u64> {
        self.push_bot_turn(text.into(), truncated)
    }

    fn push_bot_turn(&mut self, text: String, truncated: Option<bool>) -> Option<u64> {
        let id = self.next_id()?;
        self.turns.push(Turn {
            id,
            sender: Sender::Bot,
            full_text: Some(text.clone()),
            text,
            truncated,
        });
        Some(id)
    }

    /// Attaches expanded text to the turn with `id`, leaving `text` as is
    ///
    /// Returns `false` (and changes nothing) when no such turn exists.
    pub fn set_full_text(&mut self, id: u64, text: impl Into<String>) -> bool {
        match self.turns.iter_mut().find(|turn| turn.id == id) {
            Some(turn) => {
                turn.full_text = Some(text.into());
                true
            }
            None => false,
        }
    }

    /// Looks up a turn by id
    pub fn get(&self, id: u64) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.id == id)
    }

    /// Returns the turn positioned immediately before the turn with `id`
    pub fn preceding(&self, id: u64) -> Option<&Turn> {
        let index = self.turns.iter().position(|turn| turn.id == id)?;
        index.checked_sub(1).map(|prev| &self.turns[prev])
    }

    /// All turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Most recent bot turn, if any
    pub fn last_bot_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.is_bot())
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log is empty (only possible for restored, hand-edited data)
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Owned copy of the current log
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    fn next_id(&self) -> Option<u64> {
        let next = match self.turns.iter().map(|turn| turn.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };
        if next.is_none() {
            tracing::warn!("Conversation has no turn ids left; not appending");
        }
        next
    }
}

//! Saved chat sessions
//!
//! The session store owns the collection of saved conversations, tracks
//! which one is current, and writes the whole collection back to its slot
//! after every change. It is loaded once when constructed; unreadable or
//! missing data yields an empty collection.

pub mod types;

pub use types::{title_for, DeleteOutcome, Session, SessionId, SessionSummary};

use crate::chat::Conversation;
use crate::config::StorageConfig;
use crate::error::{DormGuideError, Result};
use crate::storage::{open_or_memory, MemoryStorage, SlotStorage};
use chrono::{DateTime, Utc};

/// Default slot name for the session collection
pub const DEFAULT_SLOT: &str = "sessions";

/// Collection of saved sessions, newest first
pub struct SessionStore {
    sessions: Vec<Session>,
    current: Option<SessionId>,
    storage: Box<dyn SlotStorage>,
    slot: String,
    last_issued: SessionId,
}

impl SessionStore {
    /// Open the store over `storage`, restoring the collection in `slot`
    ///
    /// # Examples
    ///
    /// ```
    /// use dormguide::sessions::SessionStore;
    /// use dormguide::storage::MemoryStorage;
    ///
    /// let store = SessionStore::open(Box::new(MemoryStorage::new()), "sessions");
    /// assert!(store.sessions().is_empty());
    /// assert!(store.current_id().is_none());
    /// ```
    pub fn open(storage: Box<dyn SlotStorage>, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let mut sessions = match storage.read(&slot) {
            Ok(Some(raw)) => decode_sessions(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable session data in '{}': {}", slot, e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read sessions from '{}': {}", slot, e);
                Vec::new()
            }
        };
        sessions.sort_by(|a, b| b.id.cmp(&a.id));

        let last_issued = sessions.first().map_or(0, |session| session.id);
        tracing::debug!("Restored {} saved sessions", sessions.len());

        Self {
            sessions,
            current: None,
            storage,
            slot,
            last_issued,
        }
    }

    /// Open the store described by the storage configuration
    ///
    /// Falls back to in-memory storage when the database cannot be opened.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::open(open_or_memory(config.db_path.as_deref()), config.slot.clone())
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStorage::new()), DEFAULT_SLOT)
    }

    /// All sessions, newest first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Listing entries, newest first
    pub fn list(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(SessionSummary::from).collect()
    }

    /// Id of the current session, `None` while the conversation is scratch
    pub fn current_id(&self) -> Option<SessionId> {
        self.current
    }

    /// The current session, if any
    pub fn current(&self) -> Option<&Session> {
        self.current.and_then(|id| self.get(id))
    }

    /// Looks up a session by id
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id == id)
    }

    /// Creates a session seeded with the greeting and makes it current
    pub fn create(&mut self) -> &Session {
        self.create_at(Utc::now())
    }

    /// Same as [`create`](Self::create) with an explicit creation time
    pub fn create_at(&mut self, now: DateTime<Utc>) -> &Session {
        // Restored ids never exceed the largest timestamp, so this cannot overflow.
        let id = now.timestamp_millis().max(self.last_issued + 1);
        self.last_issued = id;

        self.sessions.insert(
            0,
            Session {
                id,
                title: title_for(now),
                messages: Conversation::new(),
                created_at: now,
            },
        );
        self.current = Some(id);
        tracing::info!("Created session {}", id);
        self.persist();

        &self.sessions[0]
    }

    /// Makes `id` current and returns its stored snapshot
    ///
    /// Returns `None`, leaving the current session unchanged, when `id` is
    /// unknown.
    pub fn load(&mut self, id: SessionId) -> Option<Conversation> {
        let snapshot = self.get(id)?.messages.snapshot();
        self.current = Some(id);
        tracing::info!("Loaded session {}", id);
        Some(snapshot)
    }

    /// Removes a session
    pub fn delete(&mut self, id: SessionId) -> DeleteOutcome {
        let Some(index) = self.sessions.iter().position(|session| session.id == id) else {
            return DeleteOutcome::NotFound;
        };

        self.sessions.remove(index);
        tracing::info!("Deleted session {}", id);
        self.persist();

        if self.current == Some(id) {
            self.current = None;
            DeleteOutcome::DeletedCurrent
        } else {
            DeleteOutcome::Deleted
        }
    }

    /// Overwrites the current session's snapshot
    ///
    /// Returns `false` when no session is current (nothing is written).
    pub fn sync(&mut self, conversation: &Conversation) -> bool {
        let Some(id) = self.current else {
            return false;
        };
        let Some(session) = self.sessions.iter_mut().find(|session| session.id == id) else {
            return false;
        };

        session.messages = conversation.snapshot();
        self.persist();
        true
    }

    /// Resolves a full id or unique id prefix typed by the user
    ///
    /// # Errors
    ///
    /// Returns `DormGuideError::Session` when nothing or more than one
    /// session matches.
    pub fn resolve(&self, query: &str) -> Result<SessionId> {
        let query = query.trim();
        if let Some(session) = self.sessions.iter().find(|s| s.id.to_string() == query) {
            return Ok(session.id);
        }

        let matches: Vec<SessionId> = self
            .sessions
            .iter()
            .map(|session| session.id)
            .filter(|id| !query.is_empty() && id.to_string().starts_with(query))
            .collect();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(DormGuideError::Session(format!("No session matches '{}'", query)).into()),
            _ => Err(DormGuideError::Session(format!(
                "'{}' matches {} sessions; use more digits",
                query,
                matches.len()
            ))
            .into()),
        }
    }

    fn persist(&self) {
        let result = encode_sessions(&self.sessions)
            .and_then(|raw| self.storage.write(&self.slot, &raw));
        if let Err(e) = result {
            tracing::warn!("Failed to persist sessions to '{}': {}", self.slot, e);
        }
    }
}

/// Serializes a session collection for storage
pub fn encode_sessions(sessions: &[Session]) -> Result<String> {
    Ok(serde_json::to_string(sessions).map_err(DormGuideError::Serialization)?)
}

/// Deserializes a stored session collection
///
/// # Errors
///
/// Besides malformed JSON, rejects collections holding a session id larger
/// than any creation timestamp, since new ids could not be issued after it.
pub fn decode_sessions(raw: &str) -> Result<Vec<Session>> {
    let sessions: Vec<Session> =
        serde_json::from_str(raw).map_err(DormGuideError::Serialization)?;

    let limit = DateTime::<Utc>::MAX_UTC.timestamp_millis();
    if let Some(session) = sessions.iter().find(|session| session.id > limit) {
        return Err(DormGuideError::Session(format!(
            "Session id {} is out of range",
            session.id
        ))
        .into());
    }
    Ok(sessions)
}

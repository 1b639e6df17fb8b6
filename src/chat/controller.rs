//! Conversation controller
//!
//! Drives the chat: appends the user's turn, calls the recommendation
//! service, appends the reply (or a fallback), expands and collapses bot
//! replies, and keeps the current session in sync.
//!
//! Every request goes through two phases. `begin_*` does the synchronous
//! part (optimistic append, loading on) and hands back a
//! [`PendingRequest`]; [`ChatController::resolve`] applies the outcome and
//! always clears loading. While a request is pending, new ones are refused,
//! so at most one is ever outstanding.

use crate::chat::conversation::Conversation;
use crate::chat::view::{self, RenderModel};
use crate::error::Result;
use crate::service::{Recommendation, RecommendationRequest, RecommendationService};
use crate::sessions::{DeleteOutcome, SessionId, SessionStore};
use std::collections::BTreeSet;

/// Reply used when the service answered without usable text
pub const APOLOGY: &str = "Sorry, I couldn't generate a response.";

/// Reply used when the service could not be reached
pub const CONNECTIVITY_FAILURE: &str =
    "Oops \u{2014} I couldn\u{2019}t reach the server. Try again in a moment.";

/// Text to show for a submit outcome, with the service's truncation flag
///
/// Failures never surface their details: a reply without usable text
/// becomes [`APOLOGY`], any error becomes [`CONNECTIVITY_FAILURE`].
pub fn reply_or_fallback(outcome: Result<Recommendation>) -> (String, Option<bool>) {
    match outcome {
        Ok(reply) => match reply.usable_text() {
            Some(text) => (text.to_string(), reply.truncated),
            None => {
                tracing::warn!("Recommendation reply had no usable text");
                (APOLOGY.to_string(), None)
            }
        },
        Err(e) => {
            tracing::error!("Recommendation request failed: {:#}", e);
            (CONNECTIVITY_FAILURE.to_string(), None)
        }
    }
}

/// What a pending request will do once resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Answer to a submitted question
    Submit,
    /// Full text for an existing bot turn
    Expand {
        /// Bot turn being expanded
        turn_id: u64,
    },
}

/// A request issued by the controller and not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    kind: RequestKind,
    request: RecommendationRequest,
}

impl PendingRequest {
    /// What resolving this request will do
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Body to send to the service
    pub fn request(&self) -> &RecommendationRequest {
        &self.request
    }
}

/// First phase of an expand or toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandStep {
    /// The turn was expanded and is now collapsed; nothing to send
    Collapsed,
    /// Nothing to do (unknown turn, not a reply to a question, busy)
    Ignored,
    /// A request for the full text must be sent
    Pending(PendingRequest),
}

/// Result of an expand or toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The turn now shows its full text
    Expanded,
    /// The turn now shows its short text
    Collapsed,
    /// Nothing happened and no request was made
    Ignored,
    /// The request failed; the turn stays collapsed
    Failed,
}

/// Chat state machine over a conversation, its sessions and a service
///
/// # Examples
///
/// ```no_run
/// use dormguide::chat::ChatController;
/// use dormguide::config::ServiceConfig;
/// use dormguide::service::create_service;
/// use dormguide::sessions::SessionStore;
///
/// # async fn example() -> dormguide::error::Result<()> {
/// let service = create_service(&ServiceConfig::default())?;
/// let mut chat = ChatController::new(service, SessionStore::in_memory());
/// chat.submit("Quiet dorm close to classes").await;
/// assert!(!chat.is_loading());
/// # Ok(())
/// # }
/// ```
pub struct ChatController {
    service: Box<dyn RecommendationService>,
    sessions: SessionStore,
    conversation: Conversation,
    expanded: BTreeSet<u64>,
    search: String,
    loading: bool,
}

impl ChatController {
    /// Creates a controller with a fresh, unsaved conversation
    pub fn new(service: Box<dyn RecommendationService>, sessions: SessionStore) -> Self {
        Self {
            service,
            sessions,
            conversation: Conversation::new(),
            expanded: BTreeSet::new(),
            search: String::new(),
            loading: false,
        }
    }

    /// The in-memory conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Saved sessions
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The service this controller talks to
    pub fn service(&self) -> &dyn RecommendationService {
        self.service.as_ref()
    }

    /// Whether a request is pending
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Ids of turns currently showing their full text
    pub fn expanded(&self) -> &BTreeSet<u64> {
        &self.expanded
    }

    /// Whether `turn_id` is showing its full text
    pub fn is_expanded(&self, turn_id: u64) -> bool {
        self.expanded.contains(&turn_id)
    }

    /// Active search query
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Sets the search query used by [`view`](Self::view)
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Clears the search query
    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Current render model
    pub fn view(&self) -> RenderModel {
        view::project(&self.conversation, &self.search, &self.expanded, self.loading)
    }

    /// Phase one of a submit: append the user turn and enter loading
    ///
    /// Returns `None`, changing nothing, for blank input or while another
    /// request is pending.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingRequest> {
        if self.loading {
            tracing::debug!("Ignoring submit while a request is pending");
            return None;
        }

        let trimmed = text.trim();
        self.conversation.append_user_turn(trimmed)?;
        self.loading = true;
        self.sessions.sync(&self.conversation);

        Some(PendingRequest {
            kind: RequestKind::Submit,
            request: RecommendationRequest::brief(trimmed),
        })
    }

    /// Phase one of a toggle: collapse, or start fetching the full text
    pub fn begin_toggle(&mut self, turn_id: u64) -> ExpandStep {
        if self.expanded.remove(&turn_id) {
            tracing::debug!("Collapsed turn {}", turn_id);
            return ExpandStep::Collapsed;
        }
        self.begin_expand(turn_id)
    }

    /// Phase one of an expand; already-expanded turns are left alone
    ///
    /// Only a bot turn directly following a user turn can be expanded; the
    /// preceding question is re-sent with `expand: true`.
    pub fn begin_expand(&mut self, turn_id: u64) -> ExpandStep {
        if self.loading || self.expanded.contains(&turn_id) {
            return ExpandStep::Ignored;
        }

        let is_bot = self
            .conversation
            .get(turn_id)
            .map_or(false, |turn| turn.is_bot());
        let question = match self.conversation.preceding(turn_id) {
            Some(prev) if is_bot && prev.is_user() => prev.text.clone(),
            _ => {
                tracing::debug!("Turn {} is not a reply to a question", turn_id);
                return ExpandStep::Ignored;
            }
        };

        self.loading = true;
        ExpandStep::Pending(PendingRequest {
            kind: RequestKind::Expand { turn_id },
            request: RecommendationRequest::expanded(question),
        })
    }

    /// Hides the full text of `turn_id`; `false` if it was not expanded
    pub fn collapse(&mut self, turn_id: u64) -> bool {
        self.expanded.remove(&turn_id)
    }

    /// Phase two: apply the service outcome and leave loading
    pub fn resolve(&mut self, pending: PendingRequest, outcome: Result<Recommendation>) {
        match pending.kind {
            RequestKind::Submit => self.finish_submit(outcome),
            RequestKind::Expand { turn_id } => self.finish_expand(turn_id, outcome),
        }
        self.loading = false;
    }

    fn finish_submit(&mut self, outcome: Result<Recommendation>) {
        let (text, truncated) = reply_or_fallback(outcome);
        self.conversation.append_bot_reply(text, truncated);
        self.sessions.sync(&self.conversation);
    }

    fn finish_expand(&mut self, turn_id: u64, outcome: Result<Recommendation>) {
        let text = match outcome {
            Ok(reply) => reply.usable_text().map(str::to_string),
            Err(e) => {
                tracing::warn!("Expanding turn {} failed: {:#}", turn_id, e);
                None
            }
        };

        let stored = text.map_or(false, |text| self.conversation.set_full_text(turn_id, text));
        if stored {
            self.expanded.insert(turn_id);
            self.sessions.sync(&self.conversation);
        } else {
            tracing::debug!("Turn {} stays collapsed", turn_id);
        }
    }

    /// Sends a pending request and resolves it
    pub async fn dispatch(&mut self, pending: PendingRequest) {
        let outcome = self.service.recommend(&pending.request).await;
        self.resolve(pending, outcome);
    }

    /// Submits a question and waits for the reply
    ///
    /// Returns `false` when the input was rejected (blank, or busy).
    pub async fn submit(&mut self, text: &str) -> bool {
        match self.begin_submit(text) {
            Some(pending) => {
                self.dispatch(pending).await;
                true
            }
            None => false,
        }
    }

    /// Collapses an expanded turn, or fetches and shows its full text
    pub async fn toggle_expand(&mut self, turn_id: u64) -> ExpandOutcome {
        let step = self.begin_toggle(turn_id);
        self.run_expand_step(turn_id, step).await
    }

    /// Shows the full text of `turn_id`; no-op when already expanded
    pub async fn expand(&mut self, turn_id: u64) -> ExpandOutcome {
        let step = self.begin_expand(turn_id);
        self.run_expand_step(turn_id, step).await
    }

    async fn run_expand_step(&mut self, turn_id: u64, step: ExpandStep) -> ExpandOutcome {
        match step {
            ExpandStep::Collapsed => ExpandOutcome::Collapsed,
            ExpandStep::Ignored => ExpandOutcome::Ignored,
            ExpandStep::Pending(pending) => {
                self.dispatch(pending).await;
                if self.is_expanded(turn_id) {
                    ExpandOutcome::Expanded
                } else {
                    ExpandOutcome::Failed
                }
            }
        }
    }

    /// Starts a new saved session and switches to it
    ///
    /// Returns `None`, changing nothing, while a request is pending.
    pub fn new_chat(&mut self) -> Option<SessionId> {
        if self.refuse_while_loading("start a new session") {
            return None;
        }
        let session = self.sessions.create();
        let id = session.id;
        self.conversation = session.messages.snapshot();
        self.expanded.clear();
        Some(id)
    }

    /// Switches to a saved session; `false` if `id` is unknown or busy
    pub fn load_session(&mut self, id: SessionId) -> bool {
        if self.refuse_while_loading("switch sessions") {
            return false;
        }
        match self.sessions.load(id) {
            Some(conversation) => {
                self.conversation = conversation;
                self.expanded.clear();
                true
            }
            None => false,
        }
    }

    /// Deletes a saved session, resetting to scratch if it was current
    ///
    /// Returns `None`, changing nothing, while a request is pending.
    pub fn delete_session(&mut self, id: SessionId) -> Option<DeleteOutcome> {
        if self.refuse_while_loading("delete a session") {
            return None;
        }
        let outcome = self.sessions.delete(id);
        if outcome == DeleteOutcome::DeletedCurrent {
            self.conversation = Conversation::new();
            self.expanded.clear();
        }
        Some(outcome)
    }

    // A pending reply belongs to the conversation it was asked in.
    fn refuse_while_loading(&self, action: &str) -> bool {
        if self.loading {
            tracing::debug!("Cannot {} while a request is pending", action);
        }
        self.loading
    }

    /// Resolves a typed session id or prefix
    pub fn resolve_session(&self, query: &str) -> Result<SessionId> {
        self.sessions.resolve(query)
    }
}

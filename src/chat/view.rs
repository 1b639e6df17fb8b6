//! Read-side projection of the chat state
//!
//! `project` turns the conversation, search query, expansion set and
//! loading flag into the rows a front end shows. It owns no state and can
//! be recomputed after every transition.

use crate::chat::conversation::{Conversation, Sender, Turn};
use std::collections::BTreeSet;

/// Placeholder row shown while a request is pending
pub const TYPING_INDICATOR: &str = "Thinking\u{2026}";

/// One visible turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRow {
    /// Id of the underlying turn
    pub id: u64,
    /// Author of the turn
    pub sender: Sender,
    /// Text to display (expanded text when expanded)
    pub content: String,
    /// Whether the expanded form is shown
    pub expanded: bool,
    /// "Show more" is offered
    pub can_expand: bool,
    /// "Show less" is offered
    pub can_collapse: bool,
}

/// A row of the rendered chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderRow {
    /// A conversation turn
    Turn(TurnRow),
    /// Synthetic typing indicator
    Typing,
}

/// Everything a front end needs to draw the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel {
    /// Visible rows in conversation order
    pub rows: Vec<RenderRow>,
    /// Whether a request is pending (input controls disabled)
    pub loading: bool,
    /// Active search query, if any
    pub search: Option<String>,
    /// Turns in the conversation before filtering
    pub total_turns: usize,
}

impl RenderModel {
    /// Visible turn rows, skipping the typing indicator
    pub fn turn_rows(&self) -> impl Iterator<Item = &TurnRow> {
        self.rows.iter().filter_map(|row| match row {
            RenderRow::Turn(turn) => Some(turn),
            RenderRow::Typing => None,
        })
    }

    /// Number of visible turns
    pub fn visible_turns(&self) -> usize {
        self.turn_rows().count()
    }
}

/// Text shown for a turn given whether it is expanded
pub fn displayed_text(turn: &Turn, expanded: bool) -> &str {
    if expanded {
        turn.full_text.as_deref().unwrap_or(&turn.text)
    } else {
        &turn.text
    }
}

/// Builds the render model for the current state
///
/// Turns are kept when their displayed text contains `search`
/// (case-insensitive); a blank query keeps everything. A typing row is
/// appended while `loading`.
///
/// # Examples
///
/// ```
/// use dormguide::chat::{project, Conversation};
/// use std::collections::BTreeSet;
///
/// let mut conversation = Conversation::new();
/// conversation.append_user_turn("Quiet dorm close to classes");
/// conversation.append_bot_turn("Try Teague Hall.");
///
/// let model = project(&conversation, "teague", &BTreeSet::new(), false);
/// assert_eq!(model.visible_turns(), 1);
/// ```
pub fn project(
    conversation: &Conversation,
    search: &str,
    expanded: &BTreeSet<u64>,
    loading: bool,
) -> RenderModel {
    let query = search.to_lowercase();

    let mut rows: Vec<RenderRow> = conversation
        .turns()
        .iter()
        .filter_map(|turn| {
            let is_expanded = turn.is_bot() && expanded.contains(&turn.id);
            let content = displayed_text(turn, is_expanded);
            if !query.is_empty() && !content.to_lowercase().contains(&query) {
                return None;
            }

            let follows_question = conversation
                .preceding(turn.id)
                .map_or(false, |prev| prev.is_user());

            Some(RenderRow::Turn(TurnRow {
                id: turn.id,
                sender: turn.sender,
                content: content.to_string(),
                expanded: is_expanded,
                can_expand: !loading && !is_expanded && follows_question && turn.is_truncated(),
                can_collapse: !loading && is_expanded,
            }))
        })
        .collect();

    if loading {
        rows.push(RenderRow::Typing);
    }

    RenderModel {
        rows,
        loading,
        search: (!query.is_empty()).then(|| search.to_string()),
        total_turns: conversation.len(),
    }
}

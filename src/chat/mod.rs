//! Chat domain: the conversation, its controller, and the render projection

pub mod controller;
pub mod conversation;
pub mod view;

pub use controller::{
    reply_or_fallback, ChatController, ExpandOutcome, ExpandStep, PendingRequest, RequestKind,
    APOLOGY, CONNECTIVITY_FAILURE,
};
pub use conversation::{text_signals_truncation, Conversation, Sender, Turn, GREETING};
pub use view::{project, RenderModel, RenderRow, TurnRow, TYPING_INDICATOR};

//! Dorm Guide - conversational dorm recommendation client
//!
//! This library provides the core functionality of the Dorm Guide: the
//! chat controller, saved sessions, the recommendation service client, and
//! configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat`: Conversation model, controller state machine, and render projection
//! - `sessions`: Saved sessions and the store that persists them
//! - `storage`: Slot-based durable storage (SQLite, in-memory)
//! - `service`: Recommendation service abstraction and HTTP client
//! - `campus`: Reference table of dorms and landmarks
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use dormguide::{ChatController, Config, SessionStore};
//! use dormguide::service::create_service;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let service = create_service(&config.service)?;
//!     let mut chat = ChatController::new(service, SessionStore::from_config(&config.storage));
//!     chat.submit("Quiet dorm close to classes").await;
//!     Ok(())
//! }
//! ```

pub mod campus;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod sessions;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatController, Conversation, RenderModel, Turn};
pub use config::Config;
pub use error::{DormGuideError, Result};
pub use sessions::{Session, SessionStore};

#[cfg(test)]
pub mod test_utils;

//! Command-line interface definition for Dorm Guide
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions, and
//! saved session management.

use clap::{Parser, Subcommand};

/// Dorm Guide - find your ideal dorm through conversation
///
/// Describe what you want in a dorm and get recommendations from the
/// Dorm Guide service. Conversations can be saved as sessions and resumed.
#[derive(Parser, Debug, Clone)]
#[command(name = "dormguide")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the SQLite file holding saved sessions
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Dorm Guide
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Override the recommendation endpoint from config
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Resume a saved session by id (or unique id prefix)
        #[arg(short, long, conflicts_with = "new")]
        resume: Option<String>,

        /// Start a new saved session right away
        #[arg(short, long)]
        new: bool,
    },

    /// Ask a single question and print the reply
    Ask {
        /// The question to send
        message: String,

        /// Request the full, untruncated answer
        #[arg(long)]
        expand: bool,

        /// Override the recommendation endpoint from config
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Manage saved chat sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Show the campus reference table
    Dorms,
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List saved sessions, newest first
    List,

    /// Print the conversation stored in a session
    Show {
        /// Session id (or unique id prefix)
        id: String,
    },

    /// Delete a saved session
    Delete {
        /// Session id (or unique id prefix)
        id: String,
    },
}

impl Commands {
    /// Endpoint passed on the command line, if the command accepts one
    pub fn endpoint_override(&self) -> Option<&str> {
        match self {
            Self::Chat { endpoint, .. } | Self::Ask { endpoint, .. } => endpoint.as_deref(),
            Self::Sessions { .. } | Self::Dorms => None,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            storage_path: None,
            command: Commands::Sessions {
                command: SessionCommand::List,
            },
        }
    }
}

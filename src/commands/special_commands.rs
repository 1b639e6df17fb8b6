//! Special commands parser for interactive chat mode
//!
//! This module parses the commands that can be entered during an
//! interactive chat. Special commands allow users to:
//! - Start, list, load and delete saved sessions
//! - Expand or collapse truncated replies
//! - Filter the visible conversation
//! - Pick a quick-filter preset
//!
//! Commands are prefixed with `/` and are case-insensitive. Anything that
//! is not a command is sent to the recommendation service.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the chat state or print information, rather
/// than being sent to the recommendation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new saved session
    NewSession,

    /// List saved sessions
    ListSessions,

    /// Switch to a saved session by id or id prefix
    LoadSession(String),

    /// Delete a saved session by id or id prefix
    DeleteSession(String),

    /// Show the full text of a reply
    Expand(u64),

    /// Show the short text of a reply
    Collapse(u64),

    /// Expand a collapsed reply or collapse an expanded one
    Toggle(u64),

    /// Filter the conversation; `None` clears the filter
    Search(Option<String>),

    /// List presets, or pre-fill the prompt with preset `n` (1-based)
    Quick(Option<usize>),

    /// Redraw the conversation
    Show,

    /// List campus places mentioned in the latest reply
    Map,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted as a question.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use dormguide::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/more 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Expand(2));
///
/// let cmd = parse_special_command("/search Quiet").unwrap();
/// assert_eq!(cmd, SpecialCommand::Search(Some("Quiet".to_string())));
///
/// let cmd = parse_special_command("quiet dorm please").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };
    let name = head.to_lowercase();
    let name = name.as_str();

    match name {
        "/new" => no_argument(name, rest, SpecialCommand::NewSession),
        "/sessions" => no_argument(name, rest, SpecialCommand::ListSessions),
        "/load" => Ok(SpecialCommand::LoadSession(required(name, rest, "/load <id>")?)),
        "/delete" => Ok(SpecialCommand::DeleteSession(required(
            name,
            rest,
            "/delete <id>",
        )?)),

        "/more" | "/expand" => Ok(SpecialCommand::Expand(turn_id(name, rest)?)),
        "/less" | "/collapse" => Ok(SpecialCommand::Collapse(turn_id(name, rest)?)),
        "/toggle" => Ok(SpecialCommand::Toggle(turn_id(name, rest)?)),

        "/search" | "/find" => Ok(SpecialCommand::Search(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),

        "/quick" => {
            if rest.is_empty() {
                return Ok(SpecialCommand::Quick(None));
            }
            match rest.parse::<usize>() {
                Ok(n) if n > 0 => Ok(SpecialCommand::Quick(Some(n))),
                _ => Err(CommandError::UnsupportedArgument {
                    command: name.to_string(),
                    arg: rest.to_string(),
                }),
            }
        }

        "/show" => no_argument(name, rest, SpecialCommand::Show),
        "/map" => no_argument(name, rest, SpecialCommand::Map),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        // Exit commands
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        // Unknown command starting with "/"
        _ => Err(CommandError::UnknownCommand(name.to_string())),
    }
}

fn no_argument(
    command: &str,
    rest: &str,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: rest.to_string(),
        })
    }
}

fn required(command: &str, rest: &str, usage: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest.to_string())
    }
}

fn turn_id(command: &str, rest: &str) -> Result<u64, CommandError> {
    let arg = required(command, rest, &format!("{} <turn>", command))?;
    arg.parse().map_err(|_| CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg,
    })
}

/// Display help text for special commands
///
/// # Examples
///
/// ```
/// use dormguide::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

SESSIONS:
  /new            - Start a new saved session
  /sessions       - List saved sessions
  /load <id>      - Switch to a saved session (id or unique prefix)
  /delete <id>    - Delete a saved session

REPLIES:
  /more <turn>    - Show the full text of a reply (also /expand)
  /less <turn>    - Show the short text again (also /collapse)
  /toggle <turn>  - Switch between short and full text

VIEW:
  /search <text>  - Only show turns containing <text> (also /find)
  /search         - Clear the filter
  /show           - Redraw the conversation
  /map            - List campus places mentioned in the latest reply

QUICK FILTERS:
  /quick          - List preset questions
  /quick <n>      - Put preset <n> on the prompt for editing

SESSION CONTROL:
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Turn numbers are shown in brackets before each message
  - Regular text (not starting with /) is sent to the Dorm Guide
"#
    );
}

use crate::chat::{Sender, Turn};
use crate::cli::SessionCommand;
use crate::config::Config;
use crate::error::Result;
use crate::sessions::{DeleteOutcome, Session, SessionId, SessionStore, SessionSummary};
use colored::Colorize;
use prettytable::{format, Table};

const TITLE_WIDTH: usize = 40;

/// Handle `sessions` subcommands
pub fn handle_sessions(config: &Config, command: SessionCommand) -> Result<()> {
    let mut store = SessionStore::from_config(&config.storage);

    match command {
        SessionCommand::List => {
            if store.sessions().is_empty() {
                println!("{}", "No saved sessions found.".yellow());
                return Ok(());
            }

            println!("\nSaved Sessions:");
            sessions_table(&store.list(), None).printstd();
            println!();
            println!(
                "Use {} to resume a session.",
                "dormguide chat --resume <ID>".cyan()
            );
            println!();
        }
        SessionCommand::Show { id } => {
            let id = store.resolve(&id)?;
            if let Some(session) = store.get(id) {
                print_transcript(session);
            }
        }
        SessionCommand::Delete { id } => {
            let id = store.resolve(&id)?;
            match store.delete(id) {
                DeleteOutcome::NotFound => {
                    println!("{}", format!("No session {}", id).yellow());
                }
                DeleteOutcome::Deleted | DeleteOutcome::DeletedCurrent => {
                    println!("{}", format!("Deleted session {}", id).green());
                }
            }
        }
    }

    Ok(())
}

/// Table of sessions, newest first, marking `current` with `*`
pub fn sessions_table(sessions: &[SessionSummary], current: Option<SessionId>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "".bold(),
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Question".bold()
    ]);

    for session in sessions {
        let marker = if current == Some(session.id) { "*" } else { "" };
        let last_question = session
            .last_question
            .as_deref()
            .map_or_else(|| "-".to_string(), |text| shorten(text, TITLE_WIDTH));

        table.add_row(prettytable::row![
            marker,
            session.id.to_string().cyan(),
            shorten(&session.title, TITLE_WIDTH),
            session.message_count,
            last_question
        ]);
    }

    table
}

/// Print every turn of a stored session
pub fn print_transcript(session: &Session) {
    println!(
        "\n{} ({})\n",
        session.title.bold(),
        session.id.to_string().cyan()
    );
    for turn in session.messages.turns() {
        println!("{}", transcript_line(turn));
    }
    println!();
}

fn transcript_line(turn: &Turn) -> String {
    let text = turn.full_text.as_deref().unwrap_or(&turn.text);
    match turn.sender {
        Sender::User => format!("{} {}", "You:".cyan().bold(), text),
        Sender::Bot => format!("{} {}", "Guide:".green().bold(), text),
    }
}

/// Shortens `text` to at most `width` characters, marking the cut with `...`
pub fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session_at(millis: i64, store: &mut SessionStore) -> SessionId {
        store
            .create_at(Utc.timestamp_millis_opt(millis).unwrap())
            .id
    }

    #[test]
    fn test_shorten_keeps_short_text() {
        assert_eq!(shorten("Teague", 10), "Teague");
    }

    #[test]
    fn test_shorten_counts_characters_not_bytes() {
        let text = "Caf\u{e9} near Franklin Street and the quad";
        let short = shorten(text, 10);
        assert_eq!(short.chars().count(), 10);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_sessions_table_lists_every_session() {
        let mut store = SessionStore::in_memory();
        let older = session_at(1_000, &mut store);
        let newer = session_at(2_000, &mut store);

        let rendered = sessions_table(&store.list(), Some(newer)).to_string();
        assert!(rendered.contains(&older.to_string()));
        assert!(rendered.contains(&newer.to_string()));
        assert!(rendered.contains('*'));
    }

    #[test]
    fn test_sessions_table_shows_last_question() {
        let mut store = SessionStore::in_memory();
        session_at(1_000, &mut store);
        let mut conversation = store.current().unwrap().messages.snapshot();
        conversation.append_user_turn("Dorm close to Franklin Street");
        store.sync(&conversation);

        let rendered = sessions_table(&store.list(), None).to_string();
        assert!(rendered.contains("Dorm close to Franklin Street"));
    }

    #[test]
    fn test_transcript_line_prefers_full_text() {
        let turn = Turn {
            id: 2,
            sender: Sender::Bot,
            text: "Cobb\u{2026}".to_string(),
            full_text: Some("Cobb is quiet.".to_string()),
            truncated: Some(true),
        };
        assert!(transcript_line(&turn).contains("Cobb is quiet."));
    }
}

/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes these top-level command modules:

- `chat`     - Interactive chat
- `ask`      - One-shot question
- `sessions` - Saved session management
- `dorms`    - Campus reference table

These handlers are intentionally small and use the library components:
the recommendation service, the chat controller, and the session store.
*/

use crate::chat::{ChatController, RenderModel, RenderRow, Sender, TurnRow, TYPING_INDICATOR};
use crate::config::Config;
use crate::error::{DormGuideError, Result};
use crate::service::{create_service, RecommendationRequest};
use crate::sessions::SessionStore;
use colored::Colorize;

// Special commands parser for the chat loop
pub mod special_commands;

// Saved session management commands
pub mod sessions;

/// Formats one turn row for the terminal
///
/// The turn id is shown in brackets so it can be passed to `/more`,
/// `/less` and `/toggle`.
pub fn format_turn_row(row: &TurnRow) -> String {
    let label = match row.sender {
        Sender::User => format!("[{}] You:", row.id).cyan().bold(),
        Sender::Bot => format!("[{}] Guide:", row.id).green().bold(),
    };

    let mut line = format!("{} {}", label, row.content);
    if row.can_expand {
        line.push_str(&format!("  {}", format!("(/more {})", row.id).dimmed()));
    } else if row.can_collapse {
        line.push_str(&format!("  {}", format!("(/less {})", row.id).dimmed()));
    }
    line
}

/// Formats a render row, including the typing indicator
pub fn format_render_row(row: &RenderRow) -> String {
    match row {
        RenderRow::Turn(turn) => format_turn_row(turn),
        RenderRow::Typing => format!("{}", TYPING_INDICATOR.dimmed().italic()),
    }
}

/// Prints a full render model
pub fn print_model(model: &RenderModel) {
    if let Some(query) = &model.search {
        println!(
            "{}",
            format!(
                "Showing {} of {} turns matching \"{}\" (/search to clear)",
                model.visible_turns(),
                model.total_turns,
                query
            )
            .yellow()
        );
    }
    for row in &model.rows {
        println!("{}", format_render_row(row));
    }
    println!();
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Builds the recommendation client and session store, wraps them in a
    //! `ChatController`, and runs a readline-based loop that submits user
    //! input and renders the conversation after every transition.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::campus;
    use crate::chat::{project, view::displayed_text, ExpandOutcome};
    use crate::sessions::DeleteOutcome;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    const BUSY: &str = "Still waiting for the last answer; try again in a moment.";

    /// Start interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `resume` - Saved session id (or unique prefix) to continue
    /// * `new_session` - Start a saved session right away
    ///
    /// # Errors
    ///
    /// Returns error if the service client or the line editor cannot be
    /// created, or if `resume` matches no single session
    pub async fn run_chat(config: Config, resume: Option<String>, new_session: bool) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let service = create_service(&config.service)?;
        let store = SessionStore::from_config(&config.storage);
        let mut chat = ChatController::new(service, store);

        if let Some(query) = resume {
            let id = chat.resolve_session(&query)?;
            chat.load_session(id);
        } else if new_session {
            chat.new_chat();
        }

        let mut rl = DefaultEditor::new()?;
        let mut prefill: Option<String> = None;

        print_welcome_banner(&chat);
        print_model(&chat.view());

        loop {
            let prompt = format_prompt(&chat);
            let readline = match prefill.take() {
                Some(text) => rl.readline_with_initial(&prompt, (text.as_str(), "")),
                None => rl.readline(&prompt),
            };

            match readline {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::None => {
                            rl.add_history_entry(trimmed)?;
                            submit(&mut chat, trimmed).await;
                        }
                        SpecialCommand::Exit => break,
                        other => {
                            if let Some(text) = handle_command(&mut chat, &config, other).await {
                                prefill = Some(text);
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Runs a special command; returns text to pre-fill the next prompt
    async fn handle_command(
        chat: &mut ChatController,
        config: &Config,
        command: SpecialCommand,
    ) -> Option<String> {
        match command {
            SpecialCommand::NewSession => match chat.new_chat() {
                Some(id) => {
                    println!("{}\n", format!("Started session {}", id).green());
                    print_model(&chat.view());
                }
                None => println!("{}\n", BUSY.yellow()),
            },
            SpecialCommand::ListSessions => {
                let store = chat.sessions();
                if store.sessions().is_empty() {
                    println!("{}\n", "No saved sessions yet. Use /new to start one.".yellow());
                } else {
                    sessions::sessions_table(&store.list(), store.current_id()).printstd();
                    println!();
                }
            }
            SpecialCommand::LoadSession(query) => match chat.resolve_session(&query) {
                Ok(id) => {
                    if chat.load_session(id) {
                        println!("{}\n", format!("Loaded session {}", id).green());
                        print_model(&chat.view());
                    } else if chat.is_loading() {
                        println!("{}\n", BUSY.yellow());
                    } else {
                        println!("{}\n", format!("No session {}", id).yellow());
                    }
                }
                Err(e) => println!("{}\n", e.to_string().red()),
            },
            SpecialCommand::DeleteSession(query) => match chat.resolve_session(&query) {
                Ok(id) => match chat.delete_session(id) {
                    None => println!("{}\n", BUSY.yellow()),
                    Some(DeleteOutcome::DeletedCurrent) => {
                        println!(
                            "{}\n",
                            format!("Deleted session {}; starting over", id).green()
                        );
                        print_model(&chat.view());
                    }
                    Some(DeleteOutcome::Deleted) => {
                        println!("{}\n", format!("Deleted session {}", id).green());
                    }
                    Some(DeleteOutcome::NotFound) => {
                        println!("{}\n", format!("No session {}", id).yellow());
                    }
                },
                Err(e) => println!("{}\n", e.to_string().red()),
            },
            SpecialCommand::Expand(turn_id) => {
                let outcome = chat.expand(turn_id).await;
                report_expand(chat, turn_id, outcome);
            }
            SpecialCommand::Collapse(turn_id) => {
                if chat.collapse(turn_id) {
                    print_turn(chat, turn_id);
                } else {
                    println!("{}\n", format!("Turn {} is not expanded", turn_id).yellow());
                }
            }
            SpecialCommand::Toggle(turn_id) => {
                let outcome = chat.toggle_expand(turn_id).await;
                report_expand(chat, turn_id, outcome);
            }
            SpecialCommand::Search(query) => {
                match query {
                    Some(query) => chat.set_search(query),
                    None => chat.clear_search(),
                }
                print_model(&chat.view());
            }
            SpecialCommand::Quick(choice) => {
                let presets = &config.chat.quick_filters;
                match choice {
                    None => print_quick_filters(presets),
                    Some(n) => match presets.get(n - 1) {
                        Some(preset) => return Some(preset.clone()),
                        None => println!(
                            "{}\n",
                            format!("No quick filter {} (1-{})", n, presets.len()).yellow()
                        ),
                    },
                }
            }
            SpecialCommand::Show => print_model(&chat.view()),
            SpecialCommand::Map => print_map(chat),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
        None
    }

    async fn submit(chat: &mut ChatController, text: &str) {
        let Some(pending) = chat.begin_submit(text) else {
            return;
        };

        println!("{}", format_render_row(&RenderRow::Typing));

        chat.dispatch(pending).await;

        if let Some(RenderRow::Turn(row)) = unfiltered(chat).rows.last() {
            println!("{}\n", format_turn_row(row));
        }
    }

    /// Render model ignoring the active search, for incremental output
    fn unfiltered(chat: &ChatController) -> RenderModel {
        project(
            chat.conversation(),
            "",
            chat.expanded(),
            chat.is_loading(),
        )
    }

    pub(super) fn print_turn(chat: &ChatController, turn_id: u64) {
        let model = unfiltered(chat);
        let row = model.turn_rows().find(|row| row.id == turn_id);
        if let Some(row) = row {
            println!("{}\n", format_turn_row(row));
        }
    }

    fn report_expand(chat: &ChatController, turn_id: u64, outcome: ExpandOutcome) {
        match outcome {
            ExpandOutcome::Expanded | ExpandOutcome::Collapsed => print_turn(chat, turn_id),
            ExpandOutcome::Ignored if chat.is_expanded(turn_id) => print_turn(chat, turn_id),
            ExpandOutcome::Ignored => println!(
                "{}\n",
                format!("Turn {} has no longer answer to show", turn_id).yellow()
            ),
            // Expansion failures are silent; the turn simply stays short.
            ExpandOutcome::Failed => print_turn(chat, turn_id),
        }
    }

    fn print_quick_filters(presets: &[String]) {
        if presets.is_empty() {
            println!("{}\n", "No quick filters configured.".yellow());
            return;
        }
        println!("\nQuick filters:");
        for (i, preset) in presets.iter().enumerate() {
            println!("  {}. {}", (i + 1).to_string().cyan(), preset);
        }
        println!("\nUse /quick <n> to put one on the prompt.\n");
    }

    fn print_map(chat: &ChatController) {
        let Some(turn) = chat.conversation().last_bot_turn() else {
            return;
        };
        let text = displayed_text(turn, chat.is_expanded(turn.id));
        let places = campus::mentioned_in(text);

        if places.is_empty() {
            println!(
                "{}\n",
                "The latest reply doesn't mention any mapped places.".yellow()
            );
            return;
        }

        println!("\nPlaces in the latest reply:");
        for place in places {
            println!(
                "  {} ({}) {:.4}, {:.4}",
                place.name.bold(),
                place.kind,
                place.lat,
                place.lng
            );
        }
        println!();
    }

    fn format_prompt(chat: &ChatController) -> String {
        let session = match chat.sessions().current_id() {
            Some(id) => format!("session {}", id),
            None => "unsaved".to_string(),
        };
        format!("{} {} ", format!("[{}]", session).dimmed(), ">>".green().bold())
    }

    fn print_welcome_banner(chat: &ChatController) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              UNC Dorm Guide - Interactive Chat               ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Service:  {}", chat.service().endpoint().cyan());
        println!("Sessions: {} saved", chat.sessions().sessions().len());
        println!("\nType '/help' for available commands, 'exit' to quit\n");
    }
}

// One-shot question handler
pub mod ask {
    use super::*;
    use crate::chat::reply_or_fallback;

    /// Send one question and print the reply
    ///
    /// Service failures are reported the same way the chat reports them,
    /// so the command still succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if `message` is blank or the client cannot be created
    pub async fn run_ask(config: Config, message: String, expand: bool) -> Result<()> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DormGuideError::InvalidInput("message must not be empty".to_string()).into());
        }

        let service = create_service(&config.service)?;
        let request = if expand {
            RecommendationRequest::expanded(message)
        } else {
            RecommendationRequest::brief(message)
        };

        let (text, truncated) = reply_or_fallback(service.recommend(&request).await);
        println!("{}", text);
        if truncated == Some(true) && !expand {
            println!("{}", "(truncated; rerun with --expand for the full answer)".dimmed());
        }
        Ok(())
    }
}

// Campus reference table
pub mod dorms {
    use crate::campus::{self, Place};
    use colored::Colorize;
    use prettytable::{format, Table};

    /// Print the campus reference table
    pub fn show_dorms() {
        println!("\nUNC Dorms:");
        places_table(campus::dorms(), true).printstd();
        println!("\nLandmarks:");
        places_table(campus::landmarks(), false).printstd();
        println!();
    }

    /// Table of places, optionally with walking distances to landmarks
    pub fn places_table<'a>(places: impl Iterator<Item = &'a Place>, with_distances: bool) -> Table {
        let landmarks: Vec<&Place> = campus::landmarks().collect();

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

        let mut header = vec![
            prettytable::Cell::new(&"Name".bold().to_string()),
            prettytable::Cell::new(&"Latitude".bold().to_string()),
            prettytable::Cell::new(&"Longitude".bold().to_string()),
        ];
        if with_distances {
            for landmark in &landmarks {
                header.push(prettytable::Cell::new(
                    &format!("km to {}", landmark.name).bold().to_string(),
                ));
            }
        }
        table.add_row(prettytable::Row::new(header));

        for place in places {
            let mut cells = vec![
                prettytable::Cell::new(&place.name.cyan().to_string()),
                prettytable::Cell::new(&format!("{:.4}", place.lat)),
                prettytable::Cell::new(&format!("{:.4}", place.lng)),
            ];
            if with_distances {
                for landmark in &landmarks {
                    cells.push(prettytable::Cell::new(&format!(
                        "{:.2}",
                        place.distance_km(landmark)
                    )));
                }
            }
            table.add_row(prettytable::Row::new(cells));
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sender: Sender, can_expand: bool, can_collapse: bool) -> TurnRow {
        TurnRow {
            id: 2,
            sender,
            content: "Cobb is quiet\u{2026}".to_string(),
            expanded: can_collapse,
            can_expand,
            can_collapse,
        }
    }

    #[test]
    fn test_format_turn_row_shows_id_and_content() {
        let line = format_turn_row(&row(Sender::Bot, false, false));
        assert!(line.contains("[2] Guide:"));
        assert!(line.contains("Cobb is quiet\u{2026}"));
        assert!(!line.contains("/more"));
    }

    #[test]
    fn test_format_turn_row_offers_more_when_expandable() {
        let line = format_turn_row(&row(Sender::Bot, true, false));
        assert!(line.contains("(/more 2)"));
    }

    #[test]
    fn test_format_turn_row_offers_less_when_expanded() {
        let line = format_turn_row(&row(Sender::Bot, false, true));
        assert!(line.contains("(/less 2)"));
    }

    #[test]
    fn test_format_user_row() {
        let line = format_turn_row(&row(Sender::User, false, false));
        assert!(line.contains("[2] You:"));
    }

    #[test]
    fn test_format_typing_row() {
        assert!(format_render_row(&RenderRow::Typing).contains(TYPING_INDICATOR));
    }

    #[test]
    fn test_places_table_includes_distances() {
        let table = dorms::places_table(crate::campus::dorms(), true).to_string();
        assert!(table.contains("Cobb Residence Hall"));
        assert!(table.contains("km to Franklin Street"));

        let table = dorms::places_table(crate::campus::landmarks(), false).to_string();
        assert!(table.contains("Davis Library"));
        assert!(!table.contains("km to"));
    }

    #[tokio::test]
    async fn test_print_turn_handles_known_and_unknown_turns() {
        use crate::service::Recommendation;
        use crate::test_utils::ScriptedService;

        let service = ScriptedService::new();
        service.push_reply(Recommendation::text("Try Teague Hall."));
        let mut controller = ChatController::new(Box::new(service), SessionStore::in_memory());
        controller.submit("Quiet dorm").await;

        chat::print_turn(&controller, 2);
        chat::print_turn(&controller, 99);
    }

    #[tokio::test]
    async fn test_run_ask_rejects_blank_message() {
        let result = ask::run_ask(Config::default(), "   ".to_string(), false).await;
        crate::test_utils::assert_error_contains(result, "must not be empty");
    }
}

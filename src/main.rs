//! Dorm Guide - conversational dorm recommendations
//!
#![doc = "Dorm Guide - conversational dorm recommendations"]
#![doc = "Main entry point for the dormguide CLI."]

use anyhow::Result;

use dormguide::cli::{Cli, Commands};
use dormguide::commands;
use dormguide::config::Config;
use dormguide::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    logging::init_logging(cli.verbose, cli.json_logs)?;

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { resume, new, .. } => {
            if let Some(r) = &resume {
                tracing::debug!("Resuming session: {}", r);
            }
            commands::chat::run_chat(config, resume, new).await?;
            Ok(())
        }
        Commands::Ask {
            message, expand, ..
        } => {
            tracing::info!("Asking a single question");
            commands::ask::run_ask(config, message, expand).await?;
            Ok(())
        }
        Commands::Sessions { command } => {
            tracing::info!("Starting sessions command");
            commands::sessions::handle_sessions(&config, command)?;
            Ok(())
        }
        Commands::Dorms => {
            commands::dorms::show_dorms();
            Ok(())
        }
    }
}

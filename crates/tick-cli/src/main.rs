use anyhow::Result;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tick_core::audit::{AuditLog, AUDIT_FILE};
use tick_core::error::CoreError;
use tick_core::repository::JsonRepository;
use tick_core::store::DocumentStore;
use tracing::debug;

use crate::cli::Commands;

mod cli;
mod commands;
mod config;
mod logging;
mod parser;
mod query_parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    logging::init_cli();
    let cli = cli::Cli::parse();

    if let Err(e) = run(cli.command).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    let data_dir = config::data_dir()?;
    debug!(data_dir = %data_dir.display(), "resolved data directory");

    // Config commands must work even when the config itself is broken.
    if let Commands::Config(command) = command {
        return commands::config::config_command(&data_dir, command);
    }

    let config = config::Config::load(&data_dir)?;
    let reference = parser::reference_now(&config)?;
    let today = reference.date_naive();

    let repository = JsonRepository::new(
        DocumentStore::in_dir(&data_dir),
        AuditLog::open(data_dir.join(AUDIT_FILE))?,
    );

    match command {
        Commands::Add(command) => {
            commands::add::add_task(&repository, command, &config, &reference).await
        }
        Commands::List(command) => {
            commands::list::list_tasks(&repository, command, &config, today).await
        }
        Commands::View(command) => commands::view::view_task(&repository, command, today).await,
        Commands::Done(command) => commands::done::done_tasks(&repository, command).await,
        Commands::Snooze(command) => {
            commands::snooze::snooze_task(&repository, command, today).await
        }
        Commands::Edit(command) => {
            commands::edit::edit_task(&repository, command, &config, &reference).await
        }
        Commands::Delete(command) => commands::delete::delete_task(&repository, command).await,
        Commands::Search(command) => {
            commands::search::search_tasks(&repository, command, today).await
        }
        Commands::Export(command) => commands::export::export_tasks(&repository, command).await,
        Commands::Import(command) => commands::import::import_tasks(&repository, command).await,
        Commands::Sync => commands::sync::sync_status(&config),
        Commands::Today => commands::today::today_tasks(&repository, today).await,
        Commands::Config(_) => unreachable!("handled above"),
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} Task not found: {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in tasks {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::Parse(s) => {
                eprintln!(
                    "{} Could not understand the date '{}'. Try 'tomorrow', 'next friday', 'march 3' or 2024-03-03.",
                    "Error:".style(error_style),
                    s.yellow()
                );
            }
            CoreError::Io(io) => {
                eprintln!("{} {}: {}", "Error:".style(error_style), err, io);
            }
            CoreError::Json(json) => {
                eprintln!("{} {}: {}", "Error:".style(error_style), err, json);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}

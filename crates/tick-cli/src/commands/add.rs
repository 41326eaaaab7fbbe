use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use owo_colors::{OwoColorize, Style};
use tick_core::dates::{display, RepeatInterval};
use tick_core::extract::extract;
use tick_core::models::NewTaskData;
use tick_core::repository::TaskRepository;
use tracing::debug;

use crate::cli::AddCommand;
use crate::config::Config;
use crate::parser::parse_due_date;
use crate::util::confirm_guess;

/// Due date chosen for a new task and whether it had to be guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DueChoice {
    date: Option<String>,
    ambiguous: bool,
}

pub async fn add_task(
    repo: &impl TaskRepository,
    command: AddCommand,
    config: &Config,
    reference: &DateTime<Tz>,
) -> Result<()> {
    let raw_title = command.title.join(" ");
    let extraction = extract(&raw_title, reference);
    debug!(?extraction, "extracted title metadata");

    let due = match command.due.as_deref() {
        Some(flag) => {
            let resolved = parse_due_date(flag, reference)?;
            DueChoice {
                date: Some(resolved.date),
                ambiguous: resolved.ambiguous,
            }
        }
        None => DueChoice {
            date: extraction.due.clone(),
            ambiguous: extraction.ambiguous,
        },
    };

    let mut due_date = due.date;
    if due.ambiguous {
        if let Some(date) = due_date.as_deref() {
            if !confirm_guess(date, command.yes, config)? {
                println!("Keeping the task without a due date.");
                due_date = None;
            }
        }
    }

    let repeat = command
        .repeat
        .as_deref()
        .map(|r| r.parse::<RepeatInterval>().map(|interval| interval.to_string()))
        .transpose()?;

    let mut tags = extraction.tags;
    tags.extend(command.tag);

    let new_task_data = NewTaskData {
        title: extraction.title,
        notes: command.notes,
        due: due_date,
        priority: Some(
            command
                .priority
                .or(extraction.priority)
                .unwrap_or(config.default_priority),
        ),
        tags,
        repeat,
    };

    let added_task = repo.add_task(new_task_data).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let subtle_style = Style::new().bright_black();

    println!(
        "{} Added task: {}",
        "✓".style(success_style),
        added_task.title.bright_white().bold()
    );
    println!(
        "  {} ID: {}",
        "→".style(info_style),
        added_task.short_id().yellow()
    );
    if added_task.due.is_some() {
        let note = if due.ambiguous { " (guessed)" } else { "" };
        println!(
            "  {} Due: {}{}",
            "→".style(info_style),
            display(added_task.due.as_deref()).cyan(),
            note.style(subtle_style)
        );
    }
    println!(
        "  {} Priority: {}",
        "→".style(info_style),
        added_task.priority
    );
    if !added_task.tags.is_empty() {
        println!(
            "  {} Tags: {}",
            "→".style(info_style),
            added_task
                .tags
                .iter()
                .map(|t| format!("#{t}"))
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
    if let Some(repeat) = &added_task.repeat {
        println!("  {} Repeats every {}", "→".style(info_style), repeat);
    }

    Ok(())
}

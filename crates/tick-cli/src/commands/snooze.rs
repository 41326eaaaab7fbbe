use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use tick_core::dates::display;
use tick_core::repository::TaskRepository;

use crate::cli::SnoozeCommand;
use crate::util::resolve_task_id;

pub async fn snooze_task(
    repo: &impl TaskRepository,
    command: SnoozeCommand,
    today: NaiveDate,
) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.snooze_task(task_id, &command.delta, today).await?;
    println!(
        "{} Snoozed '{}' until {}",
        "✓".green().bold(),
        task.title,
        display(task.due.as_deref()).cyan()
    );
    Ok(())
}

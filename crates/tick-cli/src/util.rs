use std::io::IsTerminal;

use anyhow::Result;
use dialoguer::Confirm;
use tick_core::error::CoreError;
use tick_core::repository::TaskRepository;
use uuid::Uuid;

use crate::config::Config;

/// Shortest prefix accepted in place of a full task id.
pub const MIN_ID_PREFIX: usize = 2;

/// Turns a full id or an id prefix into exactly one task id.
pub async fn resolve_task_id(repo: &impl TaskRepository, id: &str) -> Result<Uuid> {
    if let Ok(full) = Uuid::parse_str(id) {
        return Ok(full);
    }
    if id.len() < MIN_ID_PREFIX {
        return Err(CoreError::InvalidInput(format!(
            "ID prefix must be at least {MIN_ID_PREFIX} characters long."
        ))
        .into());
    }

    let mut matches = repo.find_tasks_by_short_id_prefix(id).await?;
    match matches.len() {
        0 => Err(CoreError::NotFound(format!("No task found with ID prefix '{id}'")).into()),
        1 => Ok(matches.remove(0).id),
        _ => Err(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|task| (task.short_id(), task.title))
                .collect(),
        )
        .into()),
    }
}

/// Asks whether a guessed due date is right. Returns `true` without asking
/// when `yes` is set, confirmation is switched off, or there is no terminal.
pub fn confirm_guess(date: &str, yes: bool, config: &Config) -> Result<bool> {
    if yes || !config.confirm_ambiguous || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    let confirmed = Confirm::new()
        .with_prompt(format!("Due date was guessed as {date}. Keep it?"))
        .default(true)
        .interact()?;
    Ok(confirmed)
}

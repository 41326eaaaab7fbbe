use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tick_core::error::CoreError;
use tick_core::repository::TaskRepository;

use crate::cli::ViewCommand;
use crate::util::resolve_task_id;
use crate::views::table::display_task_details;

pub async fn view_task(
    repo: &impl TaskRepository,
    command: ViewCommand,
    today: NaiveDate,
) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(task_id.to_string())))?;
    display_task_details(&task, today);
    Ok(())
}

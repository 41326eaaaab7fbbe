use anyhow::Result;
use chrono::NaiveDate;
use tick_core::repository::TaskRepository;

use crate::cli::SearchCommand;
use crate::views::table::display_tasks;

pub async fn search_tasks(
    repo: &impl TaskRepository,
    command: SearchCommand,
    today: NaiveDate,
) -> Result<()> {
    let tasks = repo.search_tasks(&command.text.join(" ")).await?;
    display_tasks(&tasks, today);
    Ok(())
}

use anyhow::Result;
use owo_colors::OwoColorize;
use tick_core::repository::TaskRepository;

use crate::cli::DoneCommand;
use crate::util::resolve_task_id;

pub async fn done_tasks(repo: &impl TaskRepository, command: DoneCommand) -> Result<()> {
    for id in &command.ids {
        let task_id = resolve_task_id(repo, id).await?;
        let task = repo.complete_task(task_id).await?;
        println!("{} Completed task: '{}'", "✓".green().bold(), task.title);
    }
    Ok(())
}

use anyhow::{Context, Result};
use tick_core::models::{Task, TaskDocument, TaskStatus};
use tick_core::repository::TaskRepository;
use tracing::info;

use crate::cli::{ExportCommand, ExportFormat};

fn render_markdown(tasks: &[Task]) -> String {
    let mut out = String::from("# Tasks\n\n");
    for task in tasks {
        let check = match task.status {
            TaskStatus::Done => "x",
            TaskStatus::Pending => " ",
        };
        out.push_str(&format!("- [{check}] {}", task.title));
        if let Some(due) = &task.due {
            out.push_str(&format!(" (due {due})"));
        }
        out.push_str(&format!(" `{}`", task.priority));
        for tag in &task.tags {
            out.push_str(&format!(" #{tag}"));
        }
        if let Some(repeat) = &task.repeat {
            out.push_str(&format!(" (every {repeat})"));
        }
        out.push('\n');
        if let Some(notes) = &task.notes {
            for line in notes.lines() {
                out.push_str(&format!("  > {line}\n"));
            }
        }
    }
    out
}

fn render(tasks: Vec<Task>, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Json => {
            let document = TaskDocument {
                tasks,
                ..TaskDocument::default()
            };
            serde_json::to_string_pretty(&document)? + "\n"
        }
        ExportFormat::Markdown => render_markdown(&tasks),
    })
}

pub async fn export_tasks(repo: &impl TaskRepository, command: ExportCommand) -> Result<()> {
    let tasks = repo.all_tasks().await?;
    let count = tasks.len();
    let rendered = render(tasks, command.format)?;

    match command.output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(count, path = %path.display(), "exported tasks");
            println!("Exported {count} task(s) to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

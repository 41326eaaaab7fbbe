use anyhow::{Context, Result};
use serde::Deserialize;
use tick_core::models::{Task, TaskDocument};
use tick_core::repository::TaskRepository;

use crate::cli::ImportCommand;

/// Accepted import shapes: a full export document or a bare task array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Document(TaskDocument),
    Tasks(Vec<Task>),
}

impl ImportFile {
    fn into_tasks(self) -> Vec<Task> {
        match self {
            ImportFile::Document(document) => document.tasks,
            ImportFile::Tasks(tasks) => tasks,
        }
    }
}

pub async fn import_tasks(repo: &impl TaskRepository, command: ImportCommand) -> Result<()> {
    let raw = tokio::fs::read_to_string(&command.file)
        .await
        .with_context(|| format!("Failed to read {}", command.file.display()))?;
    let file: ImportFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a tick export", command.file.display()))?;

    let summary = repo.import_tasks(file.into_tasks()).await?;
    println!(
        "Imported {} task(s), skipped {}.",
        summary.imported, summary.skipped
    );
    Ok(())
}

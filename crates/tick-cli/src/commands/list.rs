use anyhow::Result;
use chrono::NaiveDate;
use tick_core::models::TaskStatus;
use tick_core::query::{Filter, Query};
use tick_core::repository::TaskRepository;

use crate::cli::ListCommand;
use crate::config::Config;
use crate::query_parser;
use crate::views::table::display_tasks;

/// Query text for `list`: the command line, else the configured defaults.
fn effective_query(command: &ListCommand, config: &Config) -> String {
    let query_str = command.query.join(" ");
    if query_str.trim().is_empty() && !config.default_filters.is_empty() {
        config.default_filters.join(" and ")
    } else {
        query_str
    }
}

pub async fn list_tasks(
    repo: &impl TaskRepository,
    command: ListCommand,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    let query = query_parser::parse_query(&effective_query(&command, config))?;

    // Completed tasks are hidden unless asked for, by flag or by the query.
    let query = match query {
        Some(q) if command.all || q.references_status() => Some(q),
        Some(q) => Some(q.and(Query::Filter(Filter::Status(TaskStatus::Pending)))),
        None if command.all => None,
        None => Some(Query::Filter(Filter::Status(TaskStatus::Pending))),
    };

    let tasks = repo.find_tasks(query.as_ref(), today).await?;
    display_tasks(&tasks, today);

    Ok(())
}

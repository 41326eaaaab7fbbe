use anyhow::Result;
use chrono::NaiveDate;
use tick_core::models::TaskStatus;
use tick_core::query::{DueDate, Filter, Operator, Query};
use tick_core::repository::TaskRepository;

use crate::views::table::display_tasks;

/// `status:pending and (due:today or due:overdue)`
fn today_query() -> Query {
    Query::Filter(Filter::Status(TaskStatus::Pending)).and(Query::Binary {
        op: Operator::Or,
        left: Box::new(Query::Filter(Filter::Due(DueDate::Today))),
        right: Box::new(Query::Filter(Filter::Due(DueDate::Overdue))),
    })
}

pub async fn today_tasks(repo: &impl TaskRepository, today: NaiveDate) -> Result<()> {
    let tasks = repo.find_tasks(Some(&today_query()), today).await?;
    if tasks.is_empty() {
        println!("Nothing due today.");
        return Ok(());
    }
    display_tasks(&tasks, today);
    Ok(())
}

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{AuditAction, AuditLog};
use crate::dates::{apply_snooze, parse_canonical, RepeatInterval};
use crate::error::CoreError;
use crate::models::{
    normalize_tags, NewTaskData, Task, TaskDocument, TaskPriority, TaskStatus, UpdateTaskData,
};
use crate::query::Query;
use crate::store::DocumentStore;

/// Outcome of merging tasks from an export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, prefix: &str) -> Result<Vec<Task>, CoreError>;
    /// Tasks matching `query` (all tasks when `None`), in display order.
    async fn find_tasks(
        &self,
        query: Option<&Query>,
        today: NaiveDate,
    ) -> Result<Vec<Task>, CoreError>;
    /// Case-insensitive substring search over title, notes and tags.
    async fn search_tasks(&self, text: &str) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError>;
    async fn complete_task(&self, id: Uuid) -> Result<Task, CoreError>;
    async fn snooze_task(&self, id: Uuid, delta: &str, today: NaiveDate)
        -> Result<Task, CoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<Task, CoreError>;
    async fn import_tasks(&self, tasks: Vec<Task>) -> Result<ImportSummary, CoreError>;
    async fn all_tasks(&self) -> Result<Vec<Task>, CoreError>;
}

pub struct JsonRepository {
    store: DocumentStore,
    audit: AuditLog,
}

impl JsonRepository {
    pub fn new(store: DocumentStore, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    fn audit(&self, action: AuditAction, task_id: Option<Uuid>, details: serde_json::Value) {
        // A failed audit write must not undo a mutation that already hit disk.
        if let Err(e) = self.audit.record(action, task_id, details) {
            warn!(error = %e, ?action, "failed to append audit entry");
        }
    }

    async fn modify<F>(&self, id: Uuid, change: F) -> Result<Task, CoreError>
    where
        F: FnOnce(&mut Task) -> Result<(), CoreError> + Send,
    {
        let mut document = self.store.read().await?;
        let task = document
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        change(task)?;
        task.updated_at = Utc::now();
        let updated = task.clone();
        self.store.write(&document).await?;
        Ok(updated)
    }
}

fn validate_due(due: &str) -> Result<String, CoreError> {
    parse_canonical(due)
        .map(crate::dates::to_canonical)
        .ok_or_else(|| CoreError::InvalidDate(format!("'{due}' is not a YYYY-MM-DD date")))
}

fn validate_repeat(repeat: &str) -> Result<String, CoreError> {
    repeat
        .parse::<RepeatInterval>()
        .map(|interval| interval.to_string())
}

/// Brings an imported task in line with what `add_task` would have stored.
fn sanitize_imported(mut task: Task) -> Result<Task, CoreError> {
    task.title = validate_title(&task.title)?;
    task.due = task.due.as_deref().map(validate_due).transpose()?;
    task.repeat = task.repeat.as_deref().map(validate_repeat).transpose()?;
    task.tags = normalize_tags(&task.tags);
    Ok(task)
}

fn validate_title(title: &str) -> Result<String, CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::InvalidInput(
            "Task title cannot be empty.".to_string(),
        ));
    }
    Ok(title.to_string())
}

/// Pending before done, then by due date (undated last), then by priority.
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    let status_rank = |t: &Task| match t.status {
        TaskStatus::Pending => 0,
        TaskStatus::Done => 1,
    };
    let due_key = |t: &Task| t.due.as_deref().and_then(parse_canonical);

    status_rank(a)
        .cmp(&status_rank(b))
        .then_with(|| match (due_key(a), due_key(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

#[async_trait]
impl TaskRepository for JsonRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: validate_title(&data.title)?,
            notes: data.notes.filter(|n| !n.trim().is_empty()),
            status: TaskStatus::Pending,
            priority: data.priority.unwrap_or(TaskPriority::Medium),
            due: data.due.as_deref().map(validate_due).transpose()?,
            tags: normalize_tags(&data.tags),
            repeat: data.repeat.as_deref().map(validate_repeat).transpose()?,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let mut document = self.store.read().await?;
        document.tasks.push(task.clone());
        self.store.write(&document).await?;

        info!(id = %task.id, title = %task.title, "added task");
        self.audit(
            AuditAction::Add,
            Some(task.id),
            json!({ "title": task.title, "due": task.due, "priority": task.priority, "tags": task.tags }),
        );
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let document = self.store.read().await?;
        Ok(document.tasks.into_iter().find(|t| t.id == id))
    }

    async fn find_tasks_by_short_id_prefix(&self, prefix: &str) -> Result<Vec<Task>, CoreError> {
        let prefix = prefix.to_lowercase().replace('-', "");
        let document = self.store.read().await?;
        Ok(document
            .tasks
            .into_iter()
            .filter(|t| t.id.simple().to_string().starts_with(&prefix))
            .collect())
    }

    async fn find_tasks(
        &self,
        query: Option<&Query>,
        today: NaiveDate,
    ) -> Result<Vec<Task>, CoreError> {
        let document = self.store.read().await?;
        let mut tasks: Vec<Task> = document
            .tasks
            .into_iter()
            .filter(|t| query.map_or(true, |q| q.matches(t, today)))
            .collect();
        tasks.sort_by(display_order);
        debug!(count = tasks.len(), "query matched tasks");
        Ok(tasks)
    }

    async fn search_tasks(&self, text: &str) -> Result<Vec<Task>, CoreError> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(CoreError::InvalidInput(
                "Search text cannot be empty.".to_string(),
            ));
        }
        let needle = needle.trim_start_matches('#');
        let document = self.store.read().await?;
        let mut tasks: Vec<Task> = document
            .tasks
            .into_iter()
            .filter(|t| {
                t.title.to_lowercase().contains(needle)
                    || t.notes
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(needle))
                    || t.tags.iter().any(|tag| tag.contains(needle))
            })
            .collect();
        tasks.sort_by(display_order);
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError> {
        let title = data.title.as_deref().map(validate_title).transpose()?;
        let due = match data.due {
            Some(Some(ref d)) => Some(Some(validate_due(d)?)),
            Some(None) => Some(None),
            None => None,
        };
        let repeat = match data.repeat {
            Some(Some(ref r)) => Some(Some(validate_repeat(r)?)),
            Some(None) => Some(None),
            None => None,
        };

        let updated = self
            .modify(id, move |task| {
                if let Some(title) = title {
                    task.title = title;
                }
                if let Some(notes) = data.notes {
                    task.notes = notes.filter(|n| !n.trim().is_empty());
                }
                if let Some(due) = due {
                    task.due = due;
                }
                if let Some(priority) = data.priority {
                    task.priority = priority;
                }
                if let Some(status) = data.status {
                    task.status = status;
                    task.completed_at = match status {
                        TaskStatus::Done => task.completed_at.or_else(|| Some(Utc::now())),
                        TaskStatus::Pending => None,
                    };
                }
                if let Some(add) = data.add_tags {
                    task.tags = normalize_tags(task.tags.iter().chain(add.iter()));
                }
                if let Some(remove) = data.remove_tags {
                    let remove: HashSet<String> = normalize_tags(&remove).into_iter().collect();
                    task.tags.retain(|t| !remove.contains(t));
                }
                if let Some(repeat) = repeat {
                    task.repeat = repeat;
                }
                Ok(())
            })
            .await?;

        info!(id = %updated.id, "updated task");
        self.audit(
            AuditAction::Update,
            Some(updated.id),
            json!({ "title": updated.title, "due": updated.due, "priority": updated.priority, "tags": updated.tags }),
        );
        Ok(updated)
    }

    async fn complete_task(&self, id: Uuid) -> Result<Task, CoreError> {
        let completed = self
            .modify(id, |task| {
                if task.status == TaskStatus::Done {
                    return Err(CoreError::InvalidInput(format!(
                        "Task '{}' is already done.",
                        task.title
                    )));
                }
                task.status = TaskStatus::Done;
                task.completed_at = Some(Utc::now());
                Ok(())
            })
            .await?;

        info!(id = %completed.id, "completed task");
        self.audit(
            AuditAction::Complete,
            Some(completed.id),
            json!({ "title": completed.title }),
        );
        Ok(completed)
    }

    async fn snooze_task(
        &self,
        id: Uuid,
        delta: &str,
        today: NaiveDate,
    ) -> Result<Task, CoreError> {
        let mut previous = None;
        let snoozed = self
            .modify(id, |task| {
                let due = apply_snooze(task.due.as_deref(), delta, today)?;
                previous = task.due.replace(due);
                Ok(())
            })
            .await?;

        info!(id = %snoozed.id, due = ?snoozed.due, "snoozed task");
        self.audit(
            AuditAction::Snooze,
            Some(snoozed.id),
            json!({ "delta": delta, "from": previous, "to": snoozed.due }),
        );
        Ok(snoozed)
    }

    async fn delete_task(&self, id: Uuid) -> Result<Task, CoreError> {
        let mut document = self.store.read().await?;
        let index = document
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        let removed = document.tasks.remove(index);
        self.store.write(&document).await?;

        info!(id = %removed.id, "deleted task");
        self.audit(
            AuditAction::Delete,
            Some(removed.id),
            json!({ "title": removed.title }),
        );
        Ok(removed)
    }

    async fn import_tasks(&self, tasks: Vec<Task>) -> Result<ImportSummary, CoreError> {
        let mut document = self.store.read().await?;
        let mut known: HashSet<Uuid> = document.tasks.iter().map(|t| t.id).collect();
        let mut summary = ImportSummary::default();

        for task in tasks {
            if known.contains(&task.id) {
                summary.skipped += 1;
                continue;
            }
            match sanitize_imported(task) {
                Ok(task) => {
                    known.insert(task.id);
                    document.tasks.push(task);
                    summary.imported += 1;
                }
                Err(e) => {
                    warn!(error = %e, "skipping imported task");
                    summary.skipped += 1;
                }
            }
        }

        if summary.imported > 0 {
            self.store.write(&document).await?;
        }

        info!(imported = summary.imported, skipped = summary.skipped, "imported tasks");
        self.audit(
            AuditAction::Import,
            None,
            json!({ "imported": summary.imported, "skipped": summary.skipped }),
        );
        Ok(summary)
    }

    async fn all_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let TaskDocument { mut tasks, .. } = self.store.read().await?;
        tasks.sort_by(display_order);
        Ok(tasks)
    }
}

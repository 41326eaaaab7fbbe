use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use tempfile::TempDir;
use tick_core::audit::{AuditLog, AUDIT_FILE};
use tick_core::dates::{display, normalize, project_occurrences};
use tick_core::extract::extract;
use tick_core::models::*;
use tick_core::query::{DueDate, Filter, Operator, Query};
use tick_core::repository::{JsonRepository, TaskRepository};
use tick_core::store::DocumentStore;

/// Helper function to create a repository in a fresh directory
fn setup_repo() -> (JsonRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let repo = JsonRepository::new(
        DocumentStore::in_dir(temp_dir.path()),
        AuditLog::open(temp_dir.path().join(AUDIT_FILE)).expect("Failed to open audit log"),
    );
    (repo, temp_dir)
}

/// Wednesday morning in New York.
fn reference() -> DateTime<Tz> {
    chrono_tz::America::New_York
        .with_ymd_and_hms(2024, 1, 10, 9, 30, 0)
        .unwrap()
}

fn today() -> NaiveDate {
    reference().date_naive()
}

/// Helper function to add a task the way the CLI does: extract, then store
async fn add_from_title(repo: &JsonRepository, title: &str) -> Task {
    let parsed = extract(title, &reference());
    repo.add_task(NewTaskData {
        title: parsed.title,
        due: parsed.due,
        priority: parsed.priority,
        tags: parsed.tags,
        ..Default::default()
    })
    .await
    .expect("Failed to add task")
}

#[tokio::test]
async fn test_extract_add_and_list_workflow() {
    let (repo, _temp_dir) = setup_repo();

    let rent = add_from_title(&repo, "Pay rent tomorrow #finance p1").await;
    assert_eq!(rent.title, "Pay rent");
    assert_eq!(rent.due.as_deref(), Some("2024-01-11"));
    assert_eq!(rent.priority, TaskPriority::Urgent);
    assert_eq!(rent.tags, vec!["finance".to_string()]);

    let milk = add_from_title(&repo, "Buy milk").await;
    assert_eq!(milk.title, "Buy milk");
    assert_eq!(milk.due, None);
    assert_eq!(display(milk.due.as_deref()), "-");

    let tomorrow = Query::Filter(Filter::Due(DueDate::Tomorrow));
    let due_tomorrow = repo.find_tasks(Some(&tomorrow), today()).await.unwrap();
    assert_eq!(due_tomorrow.len(), 1);
    assert_eq!(due_tomorrow[0].id, rent.id);

    let all = repo.find_tasks(None, today()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, rent.id, "dated tasks sort before undated ones");
}

#[tokio::test]
async fn test_snooze_complete_and_query_workflow() {
    let (repo, temp_dir) = setup_repo();

    let report = add_from_title(&repo, "Quarterly report 2024-01-31 #work").await;
    let errand = add_from_title(&repo, "Return library books #home").await;

    // Month-end clamping carries through the repository.
    let snoozed = repo.snooze_task(report.id, "+1m", today()).await.unwrap();
    assert_eq!(snoozed.due.as_deref(), Some("2024-02-29"));

    repo.complete_task(errand.id).await.unwrap();

    let pending_work = Query::Binary {
        op: Operator::And,
        left: Box::new(Query::Filter(Filter::Status(TaskStatus::Pending))),
        right: Box::new(Query::Filter(Filter::Tag("work".to_string()))),
    };
    let matched = repo.find_tasks(Some(&pending_work), today()).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, report.id);

    let audit = std::fs::read_to_string(temp_dir.path().join(AUDIT_FILE)).unwrap();
    let actions: Vec<String> = audit
        .lines()
        .map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            entry["action"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(actions, vec!["add", "add", "snooze", "complete"]);
}

#[tokio::test]
async fn test_repeat_preview_from_stored_task() {
    let (repo, _temp_dir) = setup_repo();
    let task = repo
        .add_task(NewTaskData {
            title: "Pay card".to_string(),
            due: Some(normalize("2024-01-31", &reference()).unwrap().date),
            repeat: Some("1 month".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let preview = project_occurrences(task.repeat.as_deref(), task.due.as_deref());
    assert_eq!(preview, vec!["2024-02-29", "2024-03-29", "2024-04-29"]);
}

#[tokio::test]
async fn test_tasks_survive_reopening_the_store() {
    let (repo, temp_dir) = setup_repo();
    let task = add_from_title(&repo, "Book flights march #travel").await;
    assert!(extract("Book flights march #travel", &reference()).ambiguous);
    drop(repo);

    let reopened = JsonRepository::new(DocumentStore::in_dir(temp_dir.path()), AuditLog::disabled());
    let loaded = reopened.find_task_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(loaded.title, "Book flights");
    assert_eq!(loaded.due.as_deref(), Some("2024-03-01"));
    assert_eq!(loaded.tags, vec!["travel".to_string()]);
}

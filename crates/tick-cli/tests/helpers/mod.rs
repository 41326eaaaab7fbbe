use assert_cmd::Command;
use chrono::{Days, Utc};
use std::path::Path;
use tempfile::TempDir;
use tick_core::models::{Task, TaskDocument};

/// Test harness for running CLI commands against a temporary data directory
pub struct CliTestHarness {
    temp_dir: TempDir,
}

impl CliTestHarness {
    /// Create a new test harness with an empty data directory
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tick").expect("Failed to find tick binary");

        // Keep every run inside the temp dir and on a fixed timezone.
        cmd.env("TICK_HOME", self.temp_dir.path());
        cmd.env("TICK_TIMEZONE", "UTC");
        cmd.env_remove("TICK_LOG");
        cmd.env_remove("TICK_DEFAULT_FILTERS");

        cmd
    }

    /// Get the data directory for this test instance
    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Tasks currently stored in the data directory
    pub fn stored_tasks(&self) -> Vec<Task> {
        let path = self.data_dir().join("tasks.json");
        let raw = std::fs::read_to_string(path).expect("Failed to read tasks.json");
        let document: TaskDocument = serde_json::from_str(&raw).expect("Malformed tasks.json");
        document.tasks
    }

    /// Stored task with the given title
    pub fn task_titled(&self, title: &str) -> Task {
        self.stored_tasks()
            .into_iter()
            .find(|t| t.title == title)
            .unwrap_or_else(|| panic!("No stored task titled '{title}'"))
    }
}

/// Canonical date `days` from today in UTC
pub fn days_from_today(days: u64) -> String {
    (Utc::now().date_naive() + Days::new(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Due"))
    }

    /// Predicate to check if output indicates successful task creation
    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Added task")
    }

    /// Predicate to check if output indicates successful task completion
    pub fn task_completed_successfully() -> impl Predicate<str> {
        predicate::str::contains("Completed task")
    }

    /// Predicate to check for empty result set
    pub fn empty_result() -> impl Predicate<str> {
        predicate::str::contains("No tasks found")
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}

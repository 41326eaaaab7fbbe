//! Append-only audit trail of task mutations.
//!
//! Each entry is one JSON object per line, so the log can be tailed or fed to
//! `jq` directly.

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;

pub const AUDIT_FILE: &str = "audit.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Add,
    Update,
    Complete,
    Snooze,
    Delete,
    Import,
}

#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    timestamp: String,
    action: AuditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<Uuid>,
    details: &'a serde_json::Value,
}

pub struct AuditLog {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl AuditLog {
    /// Opens (or creates) the log at `path` in append mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::from_writer(Box::new(file)))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// A log that discards everything.
    pub fn disabled() -> Self {
        Self::from_writer(Box::new(std::io::sink()))
    }

    pub fn record(
        &self,
        action: AuditAction,
        task_id: Option<Uuid>,
        details: serde_json::Value,
    ) -> Result<(), CoreError> {
        let entry = AuditEntry {
            timestamp: Utc::now().to_rfc3339(),
            action,
            task_id,
            details: &details,
        };
        let line = serde_json::to_string(&entry)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CoreError::InvalidInput("audit log lock poisoned".to_string()))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

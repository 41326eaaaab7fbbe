//! JSON document storage.
//!
//! The whole task list lives in a single pretty-printed JSON file. A missing
//! file is bootstrapped with an empty document on first read. Writes go to a
//! sibling temp file that is then renamed over the original.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::CoreError;
use crate::models::TaskDocument;

pub const DOCUMENT_FILE: &str = "tasks.json";

#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/tasks.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DOCUMENT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<TaskDocument, CoreError> {
        if !fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "bootstrapping empty task document");
            let document = TaskDocument::default();
            self.write(&document).await?;
            return Ok(document);
        }

        let raw = fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(TaskDocument::default());
        }
        let document: TaskDocument = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), tasks = document.tasks.len(), "read task document");
        Ok(document)
    }

    pub async fn write(&self, document: &TaskDocument) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(document)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.path).await?;
        debug!(path = %self.path.display(), tasks = document.tasks.len(), "wrote task document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    #[tokio::test]
    async fn test_missing_file_is_bootstrapped() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::in_dir(dir.path());

        let document = store.read().await.unwrap();
        assert_eq!(document, TaskDocument::default());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::in_dir(&dir.path().join("nested"));

        let mut document = TaskDocument::default();
        document.tasks.push(Task {
            title: "Water plants".to_string(),
            due: Some("2024-01-11".to_string()),
            ..Default::default()
        });
        store.write(&document).await.unwrap();

        let loaded = store.read().await.unwrap();
        assert_eq!(loaded, document);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_malformed_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::in_dir(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        let err = store.read().await.unwrap_err();
        assert!(matches!(err, CoreError::Json(_)));
    }
}

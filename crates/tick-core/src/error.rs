use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Could not find a date in '{0}'")]
    Parse(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid duration: '{0}' (expected tokens like +3d, 2w, -1m, 1y)")]
    InvalidDuration(String),

    #[error("Invalid priority: '{0}' (expected low, medium, high, urgent or p0-p4)")]
    InvalidPriority(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Malformed task document")]
    Json(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Title)
}

//! # Tick Core Library
//!
//! Task storage and the natural-language layer behind the `tick` CLI.
//!
//! ## Features
//!
//! - **Title Extraction**: pulls a due date, hashtags and a priority marker
//!   out of a free-text task title
//! - **Date Normalization**: explicit, relative and partial dates resolved
//!   against a timezone-aware reference instant, with an ambiguity flag when
//!   day, month or year had to be guessed
//! - **Calendar Arithmetic**: compact duration tokens (`+1w2d`, `-1m`) with
//!   end-of-month clamping, snoozing and repeat previews
//! - **Filtering**: boolean queries over status, tags, priority and due dates
//! - **Storage**: a single JSON document plus an append-only audit log
//!
//! ## Core Modules
//!
//! - [`recognizer`]: date phrase recognizers
//! - [`dates`]: normalization, durations, snoozing and repeat previews
//! - [`extract`]: title metadata extraction
//! - [`models`]: core data structures and transfer objects
//! - [`query`]: filter expressions
//! - [`store`]: JSON document persistence
//! - [`audit`]: JSON-lines audit trail
//! - [`repository`]: data access layer with Repository pattern
//! - [`error`]: error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use tick_core::{
//!     audit::AuditLog,
//!     extract::extract,
//!     models::NewTaskData,
//!     repository::{JsonRepository, TaskRepository},
//!     store::DocumentStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tick_core::error::CoreError> {
//!     let repo = JsonRepository::new(DocumentStore::new("tasks.json"), AuditLog::disabled());
//!     let now = Utc::now().with_timezone(&chrono_tz::Europe::Berlin);
//!
//!     let parsed = extract("Submit report friday #work p2", &now);
//!     let task = repo
//!         .add_task(NewTaskData {
//!             title: parsed.title,
//!             due: parsed.due,
//!             priority: parsed.priority,
//!             tags: parsed.tags,
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Created task: {}", task.title);
//!
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod dates;
pub mod error;
pub mod extract;
pub mod models;
pub mod query;
pub mod recognizer;
pub mod repository;
pub mod store;

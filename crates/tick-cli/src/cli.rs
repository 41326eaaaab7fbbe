use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tick_core::models::{parse_priority, TaskPriority};

/// A small personal task tracker. Type dates, #tags and priorities straight
/// into the task title.
#[derive(Parser, Debug)]
#[command(name = "tick", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List tasks
    List(ListCommand),
    /// Show one task in detail
    View(ViewCommand),
    /// Mark tasks as done
    Done(DoneCommand),
    /// Push a task's due date by a duration such as +3d or 1w
    Snooze(SnoozeCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Search titles, notes and tags
    Search(SearchCommand),
    /// Export tasks
    Export(ExportCommand),
    /// Import tasks from a JSON export
    Import(ImportCommand),
    /// Inspect or change configuration
    Config(ConfigCommand),
    /// Show sync status
    Sync,
    /// Pending tasks due today or overdue
    Today,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The task title. Dates ("tomorrow", "next friday", "march 3"), #tags
    /// and priorities (p1-p4, low..urgent) are picked out of it
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
    /// Due date; overrides any date in the title
    #[arg(short, long)]
    pub due: Option<String>,
    /// Priority; overrides any priority in the title
    #[arg(short, long, alias = "p", value_parser = parse_priority)]
    pub priority: Option<TaskPriority>,
    /// Tags to add to the task
    #[arg(short, long)]
    pub tag: Vec<String>,
    /// Repeat interval, e.g. "2 weeks"
    #[arg(short, long)]
    pub repeat: Option<String>,
    /// Free-form notes
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Accept a guessed due date without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// A filter query (e.g., "tag:work and (priority:high or due:overdue)")
    #[arg(num_args = 0..)]
    pub query: Vec<String>,
    /// Include completed tasks
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ViewCommand {
    /// The ID (or ID prefix) of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// IDs (or ID prefixes) of the tasks to complete
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SnoozeCommand {
    /// The ID (or ID prefix) of the task
    pub id: String,
    /// Duration such as +3d, 1w2d or -1m
    #[arg(allow_hyphen_values = true)]
    pub delta: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID (or ID prefix) of the task to edit
    pub id: String,

    /// New title; dates, tags and priorities in it are extracted
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub clear_due: bool,

    #[arg(short, long, alias = "p", value_parser = parse_priority)]
    pub priority: Option<TaskPriority>,

    /// Add tags to the task
    #[arg(long)]
    pub add_tag: Vec<String>,

    /// Remove tags from the task
    #[arg(long)]
    pub remove_tag: Vec<String>,

    #[arg(long)]
    pub repeat: Option<String>,
    #[arg(long, conflicts_with = "repeat")]
    pub clear_repeat: bool,

    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    pub clear_notes: bool,

    /// Accept a guessed due date without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or ID prefix) of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    /// Text to look for
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportCommand {
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ImportCommand {
    /// A JSON file produced by `tick export`
    pub file: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: Option<ConfigSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Set a configuration value
    Set {
        /// One of default_priority, timezone, confirm_ambiguous,
        /// default_filters, sync.provider, sync.endpoint, sync.token
        key: String,
        value: String,
    },
}

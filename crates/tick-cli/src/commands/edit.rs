use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use tick_core::extract::extract;
use tick_core::models::UpdateTaskData;
use tick_core::repository::TaskRepository;

use crate::cli::EditCommand;
use crate::config::Config;
use crate::parser::parse_due_date;
use crate::util::{confirm_guess, resolve_task_id};

/// An update plus whether its new due date had to be guessed.
#[derive(Debug)]
struct EditPlan {
    update: UpdateTaskData,
    guessed_due: bool,
}

/// Builds the update from the flags. A new title goes through the extractor;
/// what it finds fills in fields that no explicit flag set.
fn build_update(command: EditCommand, reference: &DateTime<Tz>) -> Result<EditPlan> {
    let extraction = command.title.as_deref().map(|t| extract(t, reference));

    let mut guessed_due = false;
    let due = if command.clear_due {
        Some(None)
    } else if let Some(due_str) = command.due.as_deref() {
        let resolved = parse_due_date(due_str, reference)?;
        guessed_due = resolved.ambiguous;
        Some(Some(resolved.date))
    } else {
        match extraction.as_ref() {
            Some(e) if e.due.is_some() => {
                guessed_due = e.ambiguous;
                Some(e.due.clone())
            }
            _ => None,
        }
    };

    let priority = command
        .priority
        .or_else(|| extraction.as_ref().and_then(|e| e.priority));

    let mut add_tags = command.add_tag;
    if let Some(e) = &extraction {
        add_tags.extend(e.tags.iter().cloned());
    }

    let notes = if command.clear_notes {
        Some(None)
    } else {
        command.notes.map(Some)
    };

    let repeat = if command.clear_repeat {
        Some(None)
    } else {
        command.repeat.map(Some)
    };

    let update = UpdateTaskData {
        title: extraction.map(|e| e.title),
        notes,
        due,
        priority,
        status: None,
        add_tags: if add_tags.is_empty() {
            None
        } else {
            Some(add_tags)
        },
        remove_tags: if command.remove_tag.is_empty() {
            None
        } else {
            Some(command.remove_tag)
        },
        repeat,
    };
    Ok(EditPlan {
        update,
        guessed_due,
    })
}

pub async fn edit_task(
    repo: &impl TaskRepository,
    command: EditCommand,
    config: &Config,
    reference: &DateTime<Tz>,
) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let yes = command.yes;
    let EditPlan {
        mut update,
        guessed_due,
    } = build_update(command, reference)?;

    if guessed_due {
        if let Some(Some(date)) = update.due.clone() {
            if !confirm_guess(&date, yes, config)? {
                println!("Keeping the current due date.");
                update.due = None;
            }
        }
    }

    let updated_task = repo.update_task(task_id, update).await?;

    println!("Updated task {}: '{}'", updated_task.short_id(), updated_task.title);
    if guessed_due {
        if let Some(due) = &updated_task.due {
            println!("  Due: {due} (guessed)");
        }
    }
    Ok(())
}

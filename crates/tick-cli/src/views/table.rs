use chrono::NaiveDate;
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use tick_core::dates::{display, parse_canonical, project_occurrences};
use tick_core::models::{Task, TaskPriority, TaskStatus};

/// Relative wording for a due date, e.g. "tomorrow" or "in 2 weeks".
pub fn relative_due(due: NaiveDate, today: NaiveDate) -> String {
    match (due - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        _ => HumanTime::from(due - today).to_string(),
    }
}

fn due_cell(task: &Task, today: NaiveDate) -> Cell {
    let text = display(task.due.as_deref());
    let Some(due) = task.due.as_deref().and_then(parse_canonical) else {
        return Cell::new(text);
    };

    let cell = Cell::new(format!("{text} ({})", relative_due(due, today)));
    if task.status != TaskStatus::Pending {
        return cell;
    }
    if due < today {
        cell.fg(Color::Red) // Overdue
    } else if due == today {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

fn priority_cell(priority: TaskPriority) -> Cell {
    let cell = Cell::new(priority.to_string());
    match priority {
        TaskPriority::Urgent => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        TaskPriority::High => cell.fg(Color::Red),
        TaskPriority::Medium => cell.fg(Color::Yellow),
        TaskPriority::Low => cell.fg(Color::Green),
    }
}

pub fn display_tasks(tasks: &[Task], today: NaiveDate) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Priority", "Due", "Tags"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(task.short_id()));

        let mut title = task.title.clone();
        if task.repeat.is_some() {
            title.push_str(" ↻");
        }
        let mut title_cell = Cell::new(title);
        if task.status == TaskStatus::Done {
            title_cell = title_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey);
        }
        row.add_cell(title_cell);

        row.add_cell(priority_cell(task.priority));
        row.add_cell(due_cell(task, today));
        row.add_cell(Cell::new(if task.tags.is_empty() {
            "-".to_string()
        } else {
            task.tags
                .iter()
                .map(|t| format!("#{t}"))
                .collect::<Vec<_>>()
                .join(" ")
        }));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_task_details(task: &Task, today: NaiveDate) {
    let mut table = Table::new();
    table.add_row(vec![Cell::new("ID"), Cell::new(task.id.to_string())]);
    table.add_row(vec![
        Cell::new("Title"),
        Cell::new(&task.title).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Status"), Cell::new(task.status.to_string())]);
    table.add_row(vec![Cell::new("Priority"), priority_cell(task.priority)]);
    table.add_row(vec![Cell::new("Due"), due_cell(task, today)]);
    table.add_row(vec![
        Cell::new("Tags"),
        Cell::new(if task.tags.is_empty() {
            "-".to_string()
        } else {
            task.tags.join(", ")
        }),
    ]);
    if let Some(notes) = &task.notes {
        table.add_row(vec![Cell::new("Notes"), Cell::new(notes)]);
    }
    if let Some(repeat) = &task.repeat {
        table.add_row(vec![Cell::new("Repeats"), Cell::new(format!("every {repeat}"))]);
        let upcoming = project_occurrences(Some(repeat), task.due.as_deref());
        if !upcoming.is_empty() {
            table.add_row(vec![Cell::new("Next"), Cell::new(upcoming.join(", "))]);
        }
    }
    table.add_row(vec![
        Cell::new("Created"),
        Cell::new(HumanTime::from(task.created_at).to_string()),
    ]);
    if let Some(completed_at) = task.completed_at {
        table.add_row(vec![
            Cell::new("Completed"),
            Cell::new(HumanTime::from(completed_at).to_string()),
        ]);
    }

    println!("{table}");
}

use chrono::NaiveDate;

use crate::dates::parse_canonical;
use crate::models::{Task, TaskPriority, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Filter(Filter),
    Not(Box<Query>),
    Binary {
        op: Operator,
        left: Box<Query>,
        right: Box<Query>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Tag(String),
    Status(TaskStatus),
    Priority(TaskPriority),
    Due(DueDate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DueDate {
    Today,
    Tomorrow,
    Overdue,
    None,
    On(NaiveDate),
    Before(NaiveDate),
    After(NaiveDate),
}

impl Query {
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Query::Filter(filter) => filter.matches(task, today),
            Query::Not(inner) => !inner.matches(task, today),
            Query::Binary { op, left, right } => match op {
                Operator::And => left.matches(task, today) && right.matches(task, today),
                Operator::Or => left.matches(task, today) || right.matches(task, today),
            },
        }
    }

    /// Whether any filter in the tree constrains task status.
    pub fn references_status(&self) -> bool {
        match self {
            Query::Filter(filter) => matches!(filter, Filter::Status(_)),
            Query::Not(inner) => inner.references_status(),
            Query::Binary { left, right, .. } => {
                left.references_status() || right.references_status()
            }
        }
    }

    /// Combines two queries with `and`.
    pub fn and(self, other: Query) -> Query {
        Query::Binary {
            op: Operator::And,
            left: Box::new(self),
            right: Box::new(other),
        }
    }
}

impl Filter {
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Filter::Tag(tag) => task.has_tag(tag),
            Filter::Status(status) => task.status == *status,
            Filter::Priority(priority) => task.priority == *priority,
            Filter::Due(due) => {
                // Unparseable stored dates only satisfy `due:none`.
                let parsed = task.due.as_deref().and_then(parse_canonical);
                match (due, parsed) {
                    (DueDate::None, parsed) => parsed.is_none(),
                    (_, None) => false,
                    (DueDate::Today, Some(d)) => d == today,
                    (DueDate::Tomorrow, Some(d)) => today.succ_opt() == Some(d),
                    (DueDate::Overdue, Some(d)) => d < today && task.is_pending(),
                    (DueDate::On(day), Some(d)) => d == *day,
                    (DueDate::Before(day), Some(d)) => d < *day,
                    (DueDate::After(day), Some(d)) => d > *day,
                }
            }
        }
    }
}

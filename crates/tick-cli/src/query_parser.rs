use std::str::FromStr;

use pest::iterators::Pairs;
use pest::pratt_parser::PrattParser;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use tick_core::dates::parse_canonical;
use tick_core::models::{parse_priority, TaskStatus};
use tick_core::query::{DueDate, Filter, Operator, Query};

#[derive(Parser)]
#[grammar = "filter.pest"]
pub struct FilterParser;

lazy_static::lazy_static! {
    static ref PRATT_PARSER: PrattParser<Rule> = {
        use pest::pratt_parser::{Assoc::*, Op};
        use Rule::*;

        PrattParser::new()
            .op(Op::infix(or, Left))
            .op(Op::infix(and, Left))
            .op(Op::prefix(not))
    };
}

#[derive(Error, Debug)]
pub enum QueryParseError {
    #[error("Query syntax error:\n{0}")]
    Pest(#[from] Box<pest::error::Error<Rule>>),
    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),
    #[error("Unknown rule: {0:?}")]
    UnknownRule(Rule),
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),
    #[error("Invalid priority value: {0}")]
    InvalidPriority(String),
    #[error("Invalid date value: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

fn parse_date_value(value: &str) -> Result<chrono::NaiveDate, QueryParseError> {
    parse_canonical(value)
        .filter(|_| value.len() == 10)
        .ok_or_else(|| QueryParseError::InvalidDate(value.to_string()))
}

fn build_filter(key: &str, value: &str) -> Result<Filter, QueryParseError> {
    let filter = match key.to_lowercase().as_str() {
        "tag" => Filter::Tag(value.trim_start_matches('#').to_lowercase()),
        "status" => {
            let status = TaskStatus::from_str(value)
                .map_err(|_| QueryParseError::InvalidStatus(value.to_string()))?;
            Filter::Status(status)
        }
        "priority" => {
            let priority = parse_priority(value)
                .map_err(|_| QueryParseError::InvalidPriority(value.to_string()))?;
            Filter::Priority(priority)
        }
        "due" => Filter::Due(match value.to_lowercase().as_str() {
            "today" => DueDate::Today,
            "tomorrow" => DueDate::Tomorrow,
            "overdue" => DueDate::Overdue,
            "none" => DueDate::None,
            _ => DueDate::On(parse_date_value(value)?),
        }),
        "before" => Filter::Due(DueDate::Before(parse_date_value(value)?)),
        "after" => Filter::Due(DueDate::After(parse_date_value(value)?)),
        _ => {
            return Err(QueryParseError::InvalidFilter(format!(
                "Unknown filter key: {}",
                key
            )))
        }
    };
    Ok(filter)
}

fn build_ast(pairs: Pairs<Rule>) -> Result<Query, QueryParseError> {
    PRATT_PARSER
        .map_primary(|primary| match primary.as_rule() {
            Rule::filter_expression => {
                let text = primary.as_str().to_string();
                let mut inner = primary.into_inner();
                let (Some(key), Some(value)) = (inner.next(), inner.next()) else {
                    return Err(QueryParseError::InvalidFilter(text));
                };
                let value = value.as_str().trim_matches('"');
                Ok(Query::Filter(build_filter(key.as_str(), value)?))
            }
            Rule::expression => build_ast(primary.into_inner()),
            rule => Err(QueryParseError::UnknownRule(rule)),
        })
        .map_prefix(|op, rhs| {
            let op_rule = op.as_rule();
            match op_rule {
                Rule::not => Ok(Query::Not(Box::new(rhs?))),
                _ => Err(QueryParseError::UnknownRule(op_rule)),
            }
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::and => Operator::And,
                Rule::or => Operator::Or,
                rule => return Err(QueryParseError::UnknownRule(rule)),
            };
            Ok(Query::Binary {
                op,
                left: Box::new(lhs?),
                right: Box::new(rhs?),
            })
        })
        .parse(pairs)
}

/// Parses a filter query. Blank input means "no filter".
pub fn parse_query(input: &str) -> Result<Option<Query>, QueryParseError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let mut pairs = FilterParser::parse(Rule::filter_query, input).map_err(Box::new)?;
    let expression = pairs
        .next()
        .filter(|pair| pair.as_rule() == Rule::expression)
        .ok_or_else(|| QueryParseError::InvalidFilter(input.to_string()))?;
    build_ast(expression.into_inner()).map(Some)
}

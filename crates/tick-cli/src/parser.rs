use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tick_core::dates::{normalize, ResolvedDate};

use crate::config::Config;

/// The current instant in the configured timezone. Every relative phrase in
/// a single command is resolved against this one value.
pub fn reference_now(config: &Config) -> Result<DateTime<Tz>> {
    let tz = config.tz()?;
    Ok(Utc::now().with_timezone(&tz))
}

/// Resolves a `--due` value typed on the command line.
pub fn parse_due_date(date_str: &str, reference: &DateTime<Tz>) -> Result<ResolvedDate> {
    Ok(normalize(date_str, reference)?)
}

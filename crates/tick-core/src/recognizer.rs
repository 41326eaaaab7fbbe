//! Natural-language date recognition.
//!
//! A [`DateRecognizer`] scans free text for a single date phrase, resolves it
//! against a reference instant, and reports which of day, month and year were
//! actually written in the text. Anything not written is inferred from the
//! reference and makes the candidate ambiguous.
//!
//! [`PatternRecognizer`] is the built-in implementation. It understands:
//!
//! - ISO dates: `2024-03-05`
//! - Casual words: `today`, `tonight`, `tomorrow`, `tmr`, `yesterday`
//! - Offsets: `in 3 weeks`, `in two days`, `2 days ago`
//! - Relative units: `next week`, `last month`, `this year`
//! - Weekdays: `friday`, `next friday`, `on monday`
//! - Month names: `march 15`, `15th of march 2025`, `march`
//! - US numeric dates: `3/15`, `3/15/2025`
//! - Ordinal days: `the 15th`
//!
//! A trailing time such as `at 5pm` is consumed with the phrase but dropped,
//! since resolved dates carry no time of day.

use std::cmp::Reverse;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, Weekday};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::dates::Duration;

/// Which calendar components were explicitly present in the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownComponents {
    pub day: bool,
    pub month: bool,
    pub year: bool,
}

impl KnownComponents {
    pub const ALL: Self = Self {
        day: true,
        month: true,
        year: true,
    };
    pub const NONE: Self = Self {
        day: false,
        month: false,
        year: false,
    };

    const DAY_MONTH: Self = Self {
        day: true,
        month: true,
        year: false,
    };

    pub fn is_complete(&self) -> bool {
        self.day && self.month && self.year
    }
}

/// A date phrase found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCandidate {
    /// Byte offset of the phrase in the scanned text.
    pub start: usize,
    /// Byte offset one past the end of the phrase.
    pub end: usize,
    pub text: String,
    /// Resolved local calendar date.
    pub date: NaiveDate,
    pub known: KnownComponents,
}

impl DateCandidate {
    pub fn is_ambiguous(&self) -> bool {
        !self.known.is_complete()
    }
}

/// Finds the best date phrase in a piece of text.
pub trait DateRecognizer {
    /// Returns the highest ranked candidate, or `None` when the text holds no
    /// recognizable date. Relative phrases are anchored at `reference`.
    fn recognize(&self, text: &str, reference: &DateTime<Tz>) -> Option<DateCandidate>;
}

/// Regex-driven recognizer for common English date phrases.
///
/// Candidates are ranked by position (earliest wins), then by length (longest
/// wins), so `march 15` beats `march` at the same offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRecognizer;

impl DateRecognizer for PatternRecognizer {
    fn recognize(&self, text: &str, reference: &DateTime<Tz>) -> Option<DateCandidate> {
        let today = reference.date_naive();
        let mut candidates = Vec::new();

        for family in FAMILIES.iter() {
            for caps in family.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                // `#friday` is a tag, not a date.
                if text[..whole.start()].ends_with('#') {
                    continue;
                }
                if let Some((date, known)) = (family.resolve)(&caps, today) {
                    candidates.push(DateCandidate {
                        start: whole.start(),
                        end: whole.end(),
                        text: whole.as_str().to_string(),
                        date,
                        known,
                    });
                }
            }
        }

        candidates
            .into_iter()
            .min_by_key(|c| (c.start, Reverse(c.end - c.start)))
    }
}

type Resolver = fn(&Captures<'_>, NaiveDate) -> Option<(NaiveDate, KnownComponents)>;

struct Family {
    regex: Regex,
    resolve: Resolver,
}

impl Family {
    fn new(parts: &[&str], resolve: Resolver) -> Self {
        Self {
            regex: Regex::new(&parts.concat()).unwrap(),
            resolve,
        }
    }
}

const MONTHS: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
// Bare "may" is far more often a verb than a month.
const MONTHS_STANDALONE: &str =
    r"(january|february|march|april|june|july|august|september|october|november|december)";
const WEEKDAYS: &str = r"(monday|tuesday|wednesday|thursday|friday|saturday|sunday)";
const COUNT: &str = r"([0-9]+|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";
const UNITS: &str = r"(day|week|month|year)s?";
const ORDINAL: &str = r"(?:st|nd|rd|th)?";
const TIME: &str = r"(?:\s+at\s+[0-9]{1,2}(?::[0-9]{2})?(?:\s*[ap]m)?|\s+[0-9]{1,2}(?::[0-9]{2})?\s*[ap]m|\s+at\s+(?:noon|midnight))?";

lazy_static! {
    static ref FAMILIES: Vec<Family> = vec![
        Family::new(&[r"\b([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})", TIME, r"\b"], resolve_iso),
        Family::new(
            &[r"(?i)\b(today|tonight|tomorrow|tmrw?|yesterday)", TIME, r"\b"],
            resolve_casual,
        ),
        Family::new(&[r"(?i)\bin\s+", COUNT, r"\s+", UNITS, TIME, r"\b"], resolve_in_offset),
        Family::new(&[r"(?i)\b", COUNT, r"\s+", UNITS, r"\s+ago\b"], resolve_ago_offset),
        Family::new(&[r"(?i)\b(next|last|this)\s+(week|month|year)\b"], resolve_relative_unit),
        Family::new(
            &[r"(?i)\b(?:on\s+)?(?:(next|last|this)\s+)?", WEEKDAYS, TIME, r"\b"],
            resolve_weekday,
        ),
        Family::new(
            &[r"(?i)\b(?:on\s+)?", MONTHS, r"\.?\s+([0-9]{1,2})", ORDINAL, r"(?:,?\s+([0-9]{4}))?", TIME, r"\b"],
            resolve_month_day,
        ),
        Family::new(
            &[r"(?i)\b(?:on\s+)?(?:the\s+)?([0-9]{1,2})", ORDINAL, r"\s+(?:of\s+)?", MONTHS, r"(?:,?\s+([0-9]{4}))?", TIME, r"\b"],
            resolve_day_month,
        ),
        Family::new(&[r"(?i)\b(?:in\s+)?", MONTHS_STANDALONE, r"(?:\s+([0-9]{4}))?\b"], resolve_month_only),
        Family::new(
            &[r"\b([0-9]{1,2})/([0-9]{1,2})(?:/([0-9]{4}|[0-9]{2}))?\b"],
            resolve_numeric,
        ),
        Family::new(&[r"(?i)\b(?:on\s+)?the\s+([0-9]{1,2})(?:st|nd|rd|th)\b"], resolve_ordinal_day),
    ];
}

fn number(caps: &Captures<'_>, index: usize) -> Option<i64> {
    caps.get(index)?.as_str().parse().ok()
}

fn count_word(word: &str) -> Option<i64> {
    match word.to_lowercase().as_str() {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        digits => digits.parse().ok(),
    }
}

fn unit_duration(unit: &str, amount: i64) -> Option<Duration> {
    let unit = unit.to_lowercase();
    let duration = if unit.starts_with("day") {
        Duration {
            days: amount,
            ..Default::default()
        }
    } else if unit.starts_with("week") {
        Duration {
            weeks: amount,
            ..Default::default()
        }
    } else if unit.starts_with("month") {
        Duration {
            months: amount,
            ..Default::default()
        }
    } else if unit.starts_with("year") {
        Duration {
            years: amount,
            ..Default::default()
        }
    } else {
        return None;
    };
    Some(duration)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday(name: &str) -> Option<Weekday> {
    name.parse().ok()
}

/// First `month`/`day` on or after `today`. Feb 29 waits for a leap year.
fn next_month_day(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    (today.year()..=today.year() + 8)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= today)
}

fn expand_year(year: i64) -> i32 {
    if year < 100 {
        2000 + year as i32
    } else {
        year as i32
    }
}

fn resolve_iso(caps: &Captures<'_>, _today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let date = NaiveDate::from_ymd_opt(
        number(caps, 1)? as i32,
        number(caps, 2)? as u32,
        number(caps, 3)? as u32,
    )?;
    Some((date, KnownComponents::ALL))
}

fn resolve_casual(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let offset = match caps.get(1)?.as_str().to_lowercase().as_str() {
        "today" | "tonight" => 0,
        "tomorrow" | "tmr" | "tmrw" => 1,
        "yesterday" => -1,
        _ => return None,
    };
    let date = today.checked_add_signed(ChronoDuration::days(offset))?;
    Some((date, KnownComponents::ALL))
}

fn resolve_in_offset(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let amount = count_word(caps.get(1)?.as_str())?;
    let date = unit_duration(caps.get(2)?.as_str(), amount)?.apply_to(today)?;
    Some((date, KnownComponents::ALL))
}

fn resolve_ago_offset(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let amount = count_word(caps.get(1)?.as_str())?;
    let date = unit_duration(caps.get(2)?.as_str(), -amount)?.apply_to(today)?;
    Some((date, KnownComponents::ALL))
}

fn resolve_relative_unit(
    caps: &Captures<'_>,
    today: NaiveDate,
) -> Option<(NaiveDate, KnownComponents)> {
    let amount = match caps.get(1)?.as_str().to_lowercase().as_str() {
        "next" => 1,
        "last" => -1,
        _ => 0,
    };
    let date = unit_duration(caps.get(2)?.as_str(), amount)?.apply_to(today)?;
    Some((date, KnownComponents::ALL))
}

fn resolve_weekday(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let target = weekday(caps.get(2)?.as_str())?;
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let ahead = (wanted - current).rem_euclid(7);

    let offset = match caps.get(1).map(|m| m.as_str().to_lowercase()).as_deref() {
        Some("next") if ahead == 0 => 7,
        Some("last") => {
            if ahead == 0 {
                -7
            } else {
                ahead - 7
            }
        }
        _ => ahead,
    };
    let date = today.checked_add_signed(ChronoDuration::days(offset))?;
    // The weekday is stated, the calendar date it lands on is not.
    Some((date, KnownComponents::NONE))
}

fn month_day_with_year(
    today: NaiveDate,
    month: u32,
    day: u32,
    year: Option<i64>,
) -> Option<(NaiveDate, KnownComponents)> {
    match year {
        Some(year) => {
            let date = NaiveDate::from_ymd_opt(expand_year(year), month, day)?;
            Some((date, KnownComponents::ALL))
        }
        None => Some((next_month_day(today, month, day)?, KnownComponents::DAY_MONTH)),
    }
}

fn resolve_month_day(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let month = month_number(caps.get(1)?.as_str())?;
    let day = number(caps, 2)? as u32;
    month_day_with_year(today, month, day, number(caps, 3))
}

fn resolve_day_month(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let day = number(caps, 1)? as u32;
    let month = month_number(caps.get(2)?.as_str())?;
    month_day_with_year(today, month, day, number(caps, 3))
}

fn resolve_month_only(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let month = month_number(caps.get(1)?.as_str())?;
    match number(caps, 2) {
        Some(year) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month, 1)?;
            Some((
                date,
                KnownComponents {
                    day: false,
                    month: true,
                    year: true,
                },
            ))
        }
        None => {
            let year = if month < today.month() {
                today.year() + 1
            } else {
                today.year()
            };
            let date = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some((
                date,
                KnownComponents {
                    day: false,
                    month: true,
                    year: false,
                },
            ))
        }
    }
}

fn resolve_numeric(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let month = number(caps, 1)? as u32;
    let day = number(caps, 2)? as u32;
    month_day_with_year(today, month, day, number(caps, 3))
}

fn resolve_ordinal_day(caps: &Captures<'_>, today: NaiveDate) -> Option<(NaiveDate, KnownComponents)> {
    let day = number(caps, 1)? as u32;
    let mut month_start = today.with_day(1)?;
    for _ in 0..12 {
        if let Some(date) = month_start.with_day(day) {
            if date >= today {
                return Some((
                    date,
                    KnownComponents {
                        day: true,
                        month: false,
                        year: false,
                    },
                ));
            }
        }
        month_start = month_start.checked_add_months(chrono::Months::new(1))?;
    }
    None
}

//! Date normalization and calendar arithmetic.
//!
//! Every date this module returns is a canonical `YYYY-MM-DD` string. Inputs
//! may be explicit ISO dates, natural-language phrases (resolved against a
//! caller-supplied reference instant), or compact duration tokens such as
//! `+3d` and `1w2d`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::CoreError;
use crate::recognizer::{DateRecognizer, PatternRecognizer};

/// Rendered in place of a missing date.
pub const DATE_PLACEHOLDER: &str = "-";

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Number of upcoming dates produced by [`project_occurrences`].
pub const OCCURRENCE_PREVIEW: usize = 3;

lazy_static! {
    static ref ISO_PREFIX: Regex = Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})").unwrap();
    static ref DURATION_TOKEN: Regex = Regex::new(r"([+-]?)([0-9]+)([A-Za-z])").unwrap();
    static ref REPEAT_RULE: Regex =
        Regex::new(r"(?i)^\s*([0-9]+)\s*(day|week|month|year)s?\s*$").unwrap();
    static ref LONG_NUMBER: Regex = Regex::new(r"[0-9]{5,}").unwrap();
}

/// A date resolved from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    /// Canonical `YYYY-MM-DD` date.
    pub date: String,
    /// True when day, month or year had to be inferred.
    pub ambiguous: bool,
}

pub fn to_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Parses a string that starts with a `YYYY-MM-DD` date. Trailing text (a time
/// component, for instance) is ignored.
pub fn parse_canonical(input: &str) -> Option<NaiveDate> {
    let caps = ISO_PREFIX.captures(input)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

/// Resolves `input` to a canonical date using the built-in recognizer.
pub fn normalize(input: &str, reference: &DateTime<Tz>) -> Result<ResolvedDate, CoreError> {
    normalize_with(input, reference, &PatternRecognizer)
}

/// Resolves `input` to a canonical date.
///
/// An explicit `YYYY-MM-DD` prefix is taken as-is and is never ambiguous.
/// Otherwise the recognizer's best candidate is used. Input the recognizer
/// cannot place is handed whole to `chrono-english`; since that parser reports
/// nothing about which components it inferred, such dates are always flagged
/// ambiguous. The fallback only sees input that contains a word, and its
/// answer is dropped when it lands before the reference year.
pub fn normalize_with<R>(
    input: &str,
    reference: &DateTime<Tz>,
    recognizer: &R,
) -> Result<ResolvedDate, CoreError>
where
    R: DateRecognizer + ?Sized,
{
    if let Some(date) = parse_canonical(input) {
        return Ok(ResolvedDate {
            date: to_canonical(date),
            ambiguous: false,
        });
    }

    if let Some(candidate) = recognizer.recognize(input, reference) {
        return Ok(ResolvedDate {
            date: to_canonical(candidate.date),
            ambiguous: candidate.is_ambiguous(),
        });
    }

    let trimmed = input.trim();
    if !trimmed.chars().any(|c| c.is_ascii_alphabetic()) || LONG_NUMBER.is_match(trimmed) {
        return Err(CoreError::Parse(input.to_string()));
    }
    // Local wall-clock time dressed as UTC keeps the resolved calendar date local.
    let anchor = Utc.from_utc_datetime(&reference.naive_local());
    let resolved = parse_date_string(trimmed, anchor, Dialect::Us)
        .map_err(|_| CoreError::Parse(input.to_string()))?
        .date_naive();
    if resolved.year() < reference.year() {
        return Err(CoreError::Parse(input.to_string()));
    }
    Ok(ResolvedDate {
        date: to_canonical(resolved),
        ambiguous: true,
    })
}

/// Renders a stored date for display.
///
/// Missing dates become [`DATE_PLACEHOLDER`]; strings that do not parse are
/// shown unchanged.
pub fn display(date: Option<&str>) -> String {
    match date {
        None => DATE_PLACEHOLDER.to_string(),
        Some(raw) => parse_canonical(raw)
            .map(to_canonical)
            .unwrap_or_else(|| raw.to_string()),
    }
}

/// A signed calendar offset. Components are independent and additive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duration {
    pub days: i64,
    pub weeks: i64,
    pub months: i64,
    pub years: i64,
}

impl Duration {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Adds the whole duration to `date` in one step: years and months first
    /// (clamping to the end of shorter months), then weeks and days.
    ///
    /// Returns `None` if the result falls outside chrono's date range.
    pub fn apply_to(&self, date: NaiveDate) -> Option<NaiveDate> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let days = self.weeks.checked_mul(7)?.checked_add(self.days)?;
        shift_days(shift_months(date, months)?, days)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            (self.years, 'y'),
            (self.months, 'm'),
            (self.weeks, 'w'),
            (self.days, 'd'),
        ];
        let mut wrote = false;
        for (value, unit) in parts.into_iter().filter(|(value, _)| *value != 0) {
            write!(f, "{value:+}{unit}")?;
            wrote = true;
        }
        if !wrote {
            write!(f, "0d")?;
        }
        Ok(())
    }
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

struct DurationScan {
    duration: Duration,
    /// Characters covered by `<sign><digits><letter>` tokens, known unit or not.
    consumed: usize,
    /// Tokens whose unit letter was one of d, w, m, y.
    recognized: usize,
}

fn scan_duration(input: &str) -> Result<DurationScan, CoreError> {
    let invalid = || CoreError::InvalidDuration(input.to_string());
    let mut scan = DurationScan {
        duration: Duration::default(),
        consumed: 0,
        recognized: 0,
    };

    for caps in DURATION_TOKEN.captures_iter(input) {
        scan.consumed += caps[0].len();

        let slot = match caps[3].to_ascii_lowercase().as_str() {
            "d" => &mut scan.duration.days,
            "w" => &mut scan.duration.weeks,
            "m" => &mut scan.duration.months,
            "y" => &mut scan.duration.years,
            _ => continue,
        };
        let magnitude: i64 = caps[2].parse().map_err(|_| invalid())?;
        let value = if &caps[1] == "-" { -magnitude } else { magnitude };
        *slot = slot.checked_add(value).ok_or_else(invalid)?;
        scan.recognized += 1;
    }

    Ok(scan)
}

/// Parses compact duration tokens such as `+3d`, `2w`, `-1m` or `1w2d`.
///
/// Repeated units accumulate (`+1d+2d` is three days). Tokens with an unknown
/// unit letter are skipped; input with no token at all is rejected.
pub fn parse_duration(input: &str) -> Result<Duration, CoreError> {
    let scan = scan_duration(input)?;
    if scan.consumed == 0 {
        return Err(CoreError::InvalidDuration(input.to_string()));
    }
    Ok(scan.duration)
}

/// Moves `current` (or `today` when there is no current date) by `delta`.
pub fn apply_snooze(
    current: Option<&str>,
    delta: &str,
    today: NaiveDate,
) -> Result<String, CoreError> {
    let anchor = match current {
        Some(raw) => parse_canonical(raw)
            .ok_or_else(|| CoreError::InvalidDate(format!("'{raw}' is not a YYYY-MM-DD date")))?,
        None => today,
    };

    let scan = scan_duration(delta)?;
    if scan.recognized == 0 {
        return Err(CoreError::InvalidDuration(delta.to_string()));
    }

    scan.duration
        .apply_to(anchor)
        .map(to_canonical)
        .ok_or_else(|| {
            CoreError::InvalidDate(format!("{anchor} shifted by {} is out of range", scan.duration))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatUnit {
    Day,
    Week,
    Month,
    Year,
}

/// A repeat rule such as `2 weeks` or `1 month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatInterval {
    pub count: u32,
    pub unit: RepeatUnit,
}

impl RepeatInterval {
    pub fn parse(rule: &str) -> Option<Self> {
        let caps = REPEAT_RULE.captures(rule)?;
        let count = caps[1].parse().ok()?;
        let unit = match caps[2].to_lowercase().as_str() {
            "day" => RepeatUnit::Day,
            "week" => RepeatUnit::Week,
            "month" => RepeatUnit::Month,
            "year" => RepeatUnit::Year,
            _ => return None,
        };
        Some(Self { count, unit })
    }

    pub fn as_duration(&self) -> Duration {
        let count = i64::from(self.count);
        match self.unit {
            RepeatUnit::Day => Duration {
                days: count,
                ..Default::default()
            },
            RepeatUnit::Week => Duration {
                weeks: count,
                ..Default::default()
            },
            RepeatUnit::Month => Duration {
                months: count,
                ..Default::default()
            },
            RepeatUnit::Year => Duration {
                years: count,
                ..Default::default()
            },
        }
    }
}

impl FromStr for RepeatInterval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "Invalid repeat '{s}'. Use a count and a unit, e.g. '2 weeks' or '1 month'"
            ))
        })
    }
}

impl fmt::Display for RepeatInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            RepeatUnit::Day => "day",
            RepeatUnit::Week => "week",
            RepeatUnit::Month => "month",
            RepeatUnit::Year => "year",
        };
        if self.count == 1 {
            write!(f, "1 {unit}")
        } else {
            write!(f, "{} {unit}s", self.count)
        }
    }
}

/// Previews the next occurrences of a repeating task.
///
/// Each date is the previous one plus the interval. Returns an empty list when
/// either input is missing or does not parse.
pub fn project_occurrences(repeat: Option<&str>, base: Option<&str>) -> Vec<String> {
    let (Some(repeat), Some(base)) = (repeat, base) else {
        return Vec::new();
    };
    let (Some(mut cursor), Some(interval)) = (parse_canonical(base), RepeatInterval::parse(repeat))
    else {
        return Vec::new();
    };

    let step = interval.as_duration();
    let mut occurrences = Vec::with_capacity(OCCURRENCE_PREVIEW);
    for _ in 0..OCCURRENCE_PREVIEW {
        match step.apply_to(cursor) {
            Some(next) => {
                occurrences.push(to_canonical(next));
                cursor = next;
            }
            None => return Vec::new(),
        }
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::DateCandidate;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;

    fn reference() -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct NeverRecognizes;

    impl DateRecognizer for NeverRecognizes {
        fn recognize(&self, _text: &str, _reference: &DateTime<Tz>) -> Option<DateCandidate> {
            panic!("the ISO fast path must not consult the recognizer");
        }
    }

    mod normalize_tests {
        use super::*;

        #[test]
        fn test_iso_fast_path_is_never_ambiguous() {
            let resolved = normalize("2026-02-01", &reference()).unwrap();
            assert_eq!(
                resolved,
                ResolvedDate {
                    date: "2026-02-01".to_string(),
                    ambiguous: false
                }
            );
        }

        #[test]
        fn test_iso_fast_path_ignores_reference_and_recognizer() {
            let far = Tz::UTC.with_ymd_and_hms(1999, 6, 1, 0, 0, 0).unwrap();
            let resolved = normalize_with("2026-02-01", &far, &NeverRecognizes).unwrap();
            assert_eq!(resolved.date, "2026-02-01");
            assert!(!resolved.ambiguous);
        }

        #[test]
        fn test_iso_prefix_with_trailing_text() {
            let resolved = normalize("2024-05-06T10:00:00Z", &reference()).unwrap();
            assert_eq!(resolved.date, "2024-05-06");
            assert!(!resolved.ambiguous);
        }

        #[test]
        fn test_month_alone_is_ambiguous() {
            let resolved = normalize("March", &reference()).unwrap();
            assert!(resolved.ambiguous);
            assert_eq!(resolved.date, "2024-03-01");
        }

        #[test]
        fn test_relative_phrase_uses_reference() {
            let resolved = normalize("tomorrow", &reference()).unwrap();
            assert_eq!(resolved.date, "2024-01-11");
            assert!(!resolved.ambiguous);

            let resolved = normalize("in 3 weeks", &reference()).unwrap();
            assert_eq!(resolved.date, "2024-01-31");
        }

        #[test]
        fn test_invalid_iso_falls_through_to_recognizer() {
            // Feb 30 is not a date, but "tomorrow" later in the text is.
            let resolved = normalize("2024-02-30 or tomorrow", &reference()).unwrap();
            assert_eq!(resolved.date, "2024-01-11");
        }

        #[rstest]
        #[case("")]
        #[case("   ")]
        #[case("invalid-date")]
        #[case("buy milk")]
        #[case("3")]
        #[case("42")]
        #[case("99999999999:00")]
        #[case("noon 99999999999")]
        fn test_unrecognized_input_is_a_parse_error(#[case] input: &str) {
            let err = normalize(input, &reference()).unwrap_err();
            assert!(matches!(err, CoreError::Parse(s) if s == input));
        }

        #[test]
        fn test_weekday_wins_over_trailing_garbage() {
            // The recognizer places "friday"; the junk after it is ignored.
            let resolved = normalize("friday 99999999999:00", &reference()).unwrap();
            assert_eq!(resolved.date, "2024-01-12");
            assert!(resolved.ambiguous);
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display_placeholder() {
            assert_eq!(display(None), DATE_PLACEHOLDER);
        }

        #[test]
        fn test_display_canonical_is_idempotent() {
            assert_eq!(display(Some("2024-01-01")), "2024-01-01");
        }

        #[test]
        fn test_display_invalid_passes_through() {
            assert_eq!(display(Some("not-a-date")), "not-a-date");
            assert_eq!(display(Some("2024-02-30")), "2024-02-30");
        }

        #[test]
        fn test_display_drops_time_component() {
            assert_eq!(display(Some("2024-01-01T08:00:00Z")), "2024-01-01");
        }

        proptest! {
            #[test]
            fn test_display_round_trips_canonical_dates(days in 0i64..200_000) {
                let d = date(1900, 1, 1) + chrono::Duration::days(days);
                let canonical = to_canonical(d);
                prop_assert_eq!(display(Some(&canonical)), canonical);
            }
        }
    }

    mod duration_tests {
        use super::*;

        #[rstest]
        #[case("+3d", Duration { days: 3, ..Default::default() })]
        #[case("2w", Duration { weeks: 2, ..Default::default() })]
        #[case("-1m", Duration { months: -1, ..Default::default() })]
        #[case("1y", Duration { years: 1, ..Default::default() })]
        #[case("+1d+2d", Duration { days: 3, ..Default::default() })]
        #[case("1w2d", Duration { days: 2, weeks: 1, ..Default::default() })]
        #[case("3D", Duration { days: 3, ..Default::default() })]
        #[case("+2d-1d", Duration { days: 1, ..Default::default() })]
        #[case("1y-6m", Duration { months: -6, years: 1, ..Default::default() })]
        fn test_parse_duration(#[case] input: &str, #[case] expected: Duration) {
            assert_eq!(parse_duration(input).unwrap(), expected);
        }

        #[rstest]
        #[case("abc")]
        #[case("")]
        #[case("d3")]
        #[case("3 d")]
        fn test_parse_duration_rejects_garbage(#[case] input: &str) {
            let err = parse_duration(input).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDuration(s) if s == input));
        }

        #[test]
        fn test_unknown_units_are_skipped() {
            assert_eq!(parse_duration("5x").unwrap(), Duration::default());
            assert_eq!(
                parse_duration("5x2d").unwrap(),
                Duration {
                    days: 2,
                    ..Default::default()
                }
            );
        }

        #[test]
        fn test_overflowing_magnitude_is_rejected() {
            assert!(matches!(
                parse_duration("99999999999999999999d"),
                Err(CoreError::InvalidDuration(_))
            ));
        }

        #[test]
        fn test_apply_months_then_days() {
            // Jan 31 + 1 month clamps to Feb 29 (leap year), then + 1 day.
            let d = Duration {
                days: 1,
                months: 1,
                ..Default::default()
            };
            assert_eq!(d.apply_to(date(2024, 1, 31)), Some(date(2024, 3, 1)));
        }

        #[test]
        fn test_display_duration() {
            let d = Duration {
                days: 2,
                weeks: 1,
                ..Default::default()
            };
            assert_eq!(d.to_string(), "+1w+2d");
            assert_eq!(Duration::default().to_string(), "0d");
        }

        proptest! {
            #[test]
            fn test_day_tokens_match_day_arithmetic(n in -5000i64..5000) {
                let token = format!("{n:+}d");
                let parsed = parse_duration(&token).unwrap();
                let base = date(2024, 6, 15);
                prop_assert_eq!(parsed.apply_to(base), Some(base + chrono::Duration::days(n)));
            }
        }
    }

    mod snooze_tests {
        use super::*;

        #[test]
        fn test_snooze_one_week() {
            let today = date(2030, 1, 1);
            assert_eq!(
                apply_snooze(Some("2024-01-01"), "+1w", today).unwrap(),
                "2024-01-08"
            );
        }

        #[test]
        fn test_snooze_without_due_date_anchors_on_today() {
            let today = date(2024, 1, 10);
            assert_eq!(apply_snooze(None, "+3d", today).unwrap(), "2024-01-13");
        }

        #[test]
        fn test_snooze_combined_units_in_one_step() {
            let today = date(2024, 1, 10);
            assert_eq!(
                apply_snooze(Some("2024-01-31"), "1m1w", today).unwrap(),
                "2024-03-07"
            );
        }

        #[test]
        fn test_snooze_backwards() {
            let today = date(2024, 1, 10);
            assert_eq!(
                apply_snooze(Some("2024-03-01"), "-1d", today).unwrap(),
                "2024-02-29"
            );
        }

        #[test]
        fn test_snooze_rejects_invalid_anchor() {
            let today = date(2024, 1, 10);
            let err = apply_snooze(Some("someday"), "+1d", today).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDate(_)));
        }

        #[rstest]
        #[case("abc")]
        #[case("5x")]
        #[case("")]
        fn test_snooze_rejects_durations_without_units(#[case] delta: &str) {
            let today = date(2024, 1, 10);
            let err = apply_snooze(Some("2024-01-01"), delta, today).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDuration(_)));
        }
    }

    mod occurrence_tests {
        use super::*;

        #[test]
        fn test_two_weeks_is_cumulative() {
            assert_eq!(
                project_occurrences(Some("2 weeks"), Some("2024-01-01")),
                vec!["2024-01-15", "2024-01-29", "2024-02-12"]
            );
        }

        #[test]
        fn test_monthly_steps_from_the_running_cursor() {
            // Clamping at Feb carries into later months.
            assert_eq!(
                project_occurrences(Some("1 month"), Some("2024-01-31")),
                vec!["2024-02-29", "2024-03-29", "2024-04-29"]
            );
        }

        #[rstest]
        #[case(None, Some("2024-01-01"))]
        #[case(Some("1 week"), None)]
        #[case(Some("bogus"), Some("2024-01-01"))]
        #[case(Some("2 fortnights"), Some("2024-01-01"))]
        #[case(Some("1 week"), Some("not-a-date"))]
        fn test_empty_projection(#[case] repeat: Option<&str>, #[case] base: Option<&str>) {
            assert!(project_occurrences(repeat, base).is_empty());
        }

        #[rstest]
        #[case("1 day", 1, RepeatUnit::Day)]
        #[case("3 Days", 3, RepeatUnit::Day)]
        #[case("2weeks", 2, RepeatUnit::Week)]
        #[case("1 year", 1, RepeatUnit::Year)]
        fn test_repeat_interval_parse(
            #[case] rule: &str,
            #[case] count: u32,
            #[case] unit: RepeatUnit,
        ) {
            assert_eq!(RepeatInterval::parse(rule), Some(RepeatInterval { count, unit }));
        }

        #[test]
        fn test_repeat_interval_display() {
            assert_eq!(RepeatInterval::parse("1 weeks").unwrap().to_string(), "1 week");
            assert_eq!(RepeatInterval::parse("2 month").unwrap().to_string(), "2 months");
        }

        #[test]
        fn test_repeat_interval_from_str_error() {
            let err = "weekly".parse::<RepeatInterval>().unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput(_)));
        }
    }
}

//! Metadata extraction from free-text task titles.
//!
//! `"Pay rent tomorrow #finance p1"` becomes the title `"Pay rent"`, due
//! tomorrow, tagged `finance`, priority urgent. Steps run in a fixed order:
//! the date phrase is cut first, then hashtags, then the priority marker, so
//! that neither later step can split a date phrase and a tag such as `#high`
//! never reads as a priority.

use chrono::DateTime;
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

use crate::dates::to_canonical;
use crate::models::{normalize_tags, parse_priority, TaskPriority};
use crate::recognizer::{DateRecognizer, PatternRecognizer};

lazy_static! {
    static ref HASHTAG: Regex = Regex::new(r"#(\w+)").unwrap();
    static ref PRIORITY_MARKER: Regex =
        Regex::new(r"(?i)\b(p[1-4]|low|medium|high|urgent)\b").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Fields pulled out of a task title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// Title with date phrase, tags and priority marker removed.
    pub title: String,
    /// Canonical due date, if the title named one.
    pub due: Option<String>,
    /// Whether any part of the due date was inferred.
    pub ambiguous: bool,
    pub priority: Option<TaskPriority>,
    /// Lowercase tags without `#`, first occurrence order.
    pub tags: Vec<String>,
}

/// Extracts due date, tags and priority from `title` with the built-in recognizer.
pub fn extract(title: &str, reference: &DateTime<Tz>) -> Extraction {
    extract_with(title, reference, &PatternRecognizer)
}

pub fn extract_with<R>(title: &str, reference: &DateTime<Tz>, recognizer: &R) -> Extraction
where
    R: DateRecognizer + ?Sized,
{
    let mut working = title.to_string();
    let mut due = None;
    let mut ambiguous = false;

    if let Some(candidate) = recognizer.recognize(&working, reference) {
        if working.get(candidate.start..candidate.end).is_some() {
            due = Some(to_canonical(candidate.date));
            ambiguous = candidate.is_ambiguous();
            working.replace_range(candidate.start..candidate.end, "");
            working = collapse_whitespace(&working);
        }
    }

    let tags = normalize_tags(HASHTAG.captures_iter(&working).map(|caps| caps[1].to_string()));
    if HASHTAG.is_match(&working) {
        working = collapse_whitespace(&HASHTAG.replace_all(&working, ""));
    }

    let mut priority = None;
    if let Some(marker) = PRIORITY_MARKER.find(&working) {
        let range = marker.range();
        priority = parse_priority(marker.as_str()).ok();
        working.replace_range(range, "");
        working = collapse_whitespace(&working);
    }

    if working.is_empty() {
        working = title.to_string();
    }

    Extraction {
        title: working,
        due,
        ambiguous,
        priority,
        tags,
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{DateCandidate, KnownComponents};
    use chrono::{NaiveDate, TimeZone};
    use rstest::rstest;

    fn reference() -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    #[rstest]
    #[case("Buy milk")]
    #[case("Write the quarterly report")]
    #[case("Fix bug 1234 in parser")]
    #[case("  spaced   out  ")]
    fn test_plain_titles_pass_through(#[case] title: &str) {
        let extraction = extract(title, &reference());
        assert_eq!(extraction.title, title);
        assert_eq!(extraction.due, None);
        assert!(!extraction.ambiguous);
        assert_eq!(extraction.priority, None);
        assert!(extraction.tags.is_empty());
    }

    #[test]
    fn test_tags_and_priority_word() {
        let extraction = extract("Pay rent #finance high", &reference());
        assert_eq!(extraction.title, "Pay rent");
        assert_eq!(extraction.tags, vec!["finance".to_string()]);
        assert_eq!(extraction.priority, Some(TaskPriority::High));
        assert_eq!(extraction.due, None);
    }

    #[test]
    fn test_date_tags_and_numbered_priority() {
        let extraction = extract("Submit report tomorrow #Work #work p1", &reference());
        assert_eq!(extraction.title, "Submit report");
        assert_eq!(extraction.due.as_deref(), Some("2024-01-11"));
        assert!(!extraction.ambiguous);
        assert_eq!(extraction.tags, vec!["work".to_string()]);
        assert_eq!(extraction.priority, Some(TaskPriority::Urgent));
    }

    #[rstest]
    #[case("p1", TaskPriority::Urgent)]
    #[case("p2", TaskPriority::High)]
    #[case("P3", TaskPriority::Medium)]
    #[case("p4", TaskPriority::Low)]
    #[case("URGENT", TaskPriority::Urgent)]
    #[case("low", TaskPriority::Low)]
    fn test_priority_markers(#[case] marker: &str, #[case] expected: TaskPriority) {
        let extraction = extract(&format!("Call the bank {marker}"), &reference());
        assert_eq!(extraction.priority, Some(expected));
        assert_eq!(extraction.title, "Call the bank");
    }

    #[test]
    fn test_only_first_priority_marker_is_removed() {
        let extraction = extract("low effort high impact", &reference());
        assert_eq!(extraction.priority, Some(TaskPriority::Low));
        assert_eq!(extraction.title, "effort high impact");
    }

    #[test]
    fn test_priority_must_be_a_whole_word() {
        let extraction = extract("Drive the highway", &reference());
        assert_eq!(extraction.priority, None);
        assert_eq!(extraction.title, "Drive the highway");
    }

    #[test]
    fn test_priority_word_in_tag_is_a_tag() {
        let extraction = extract("Ship release #high", &reference());
        assert_eq!(extraction.priority, None);
        assert_eq!(extraction.tags, vec!["high".to_string()]);
        assert_eq!(extraction.title, "Ship release");
    }

    #[test]
    fn test_ambiguous_month() {
        let extraction = extract("Plan vacation March", &reference());
        assert_eq!(extraction.title, "Plan vacation");
        assert_eq!(extraction.due.as_deref(), Some("2024-03-01"));
        assert!(extraction.ambiguous);
    }

    #[test]
    fn test_date_in_the_middle_collapses_spaces() {
        let extraction = extract("Email Sam on friday about invoices", &reference());
        assert_eq!(extraction.title, "Email Sam about invoices");
        assert_eq!(extraction.due.as_deref(), Some("2024-01-12"));
    }

    #[test]
    fn test_only_first_date_is_extracted() {
        let extraction = extract("Move from tomorrow to friday", &reference());
        assert_eq!(extraction.due.as_deref(), Some("2024-01-11"));
        assert_eq!(extraction.title, "Move from to friday");
    }

    #[test]
    fn test_empty_result_falls_back_to_original_title() {
        let extraction = extract("tomorrow #errands urgent", &reference());
        assert_eq!(extraction.title, "tomorrow #errands urgent");
        assert_eq!(extraction.due.as_deref(), Some("2024-01-11"));
        assert_eq!(extraction.tags, vec!["errands".to_string()]);
        assert_eq!(extraction.priority, Some(TaskPriority::Urgent));
    }

    struct FixedRecognizer(DateCandidate);

    impl DateRecognizer for FixedRecognizer {
        fn recognize(&self, _text: &str, _reference: &DateTime<Tz>) -> Option<DateCandidate> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn test_custom_recognizer() {
        let recognizer = FixedRecognizer(DateCandidate {
            start: 5,
            end: 10,
            text: "someday".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            known: KnownComponents {
                day: false,
                month: true,
                year: true,
            },
        });
        let extraction = extract_with("Read XXXXX books", &reference(), &recognizer);
        assert_eq!(extraction.title, "Read books");
        assert_eq!(extraction.due.as_deref(), Some("2030-06-01"));
        assert!(extraction.ambiguous);
    }

    #[test]
    fn test_out_of_bounds_candidate_is_ignored() {
        let recognizer = FixedRecognizer(DateCandidate {
            start: 3,
            end: 400,
            text: String::new(),
            date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            known: KnownComponents::ALL,
        });
        let extraction = extract_with("Read", &reference(), &recognizer);
        assert_eq!(extraction.title, "Read");
        assert_eq!(extraction.due, None);
    }
}

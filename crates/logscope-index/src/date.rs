//! Date handling for log files and log lines.
//!
//! File dates come from a `yyyyMMdd` suffix after the `.txt`/`.log` marker
//! (`app.txt20251214` and `app.txt.20251214` are both accepted). A name that ends
//! in the bare marker is today's live file. Line timestamps are read from the
//! start of the line only.

use std::{sync::LazyLock, time::SystemTime};

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Date suffix after the extension marker, with or without a separating dot.
static FILE_NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:txt|log)\.?(\d{8})$").expect("file name date pattern is valid")
});

/// Leading timestamp formats, tried in order.
static TIMESTAMP_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"^\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}",
        r"^\d{4}/\d{2}/\d{2}\s+\d{2}:\d{2}:\d{2}",
        r"^\d{8}\s+\d{2}:\d{2}:\d{2}",
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}",
    ]
    .map(|pattern| Regex::new(pattern).expect("timestamp pattern is valid"))
});

/// chrono formats matching [`TIMESTAMP_PATTERNS`], used to recover a date from a stored timestamp.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y%m%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Format of the stored `file_date` field.
const FILE_DATE_FORMAT: &str = "%Y%m%d";

/// Lower bound used for an open-ended date range.
pub const MIN_FILE_DATE: &str = "00000000";

/// Upper bound used for an open-ended date range.
pub const MAX_FILE_DATE: &str = "99999999";

/// Returns today's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses the date a log file covers from its name.
///
/// Returns `None` when the name carries no usable date; callers fall back to the
/// file's modification time.
pub fn parse_date_from_file_name(name: &str) -> Option<NaiveDate> {
    parse_date_from_file_name_on(name, today())
}

/// Like [`parse_date_from_file_name`], with an explicit value for today.
pub fn parse_date_from_file_name_on(name: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = FILE_NAME_DATE.captures(name) {
        return NaiveDate::parse_from_str(&caps[1], FILE_DATE_FORMAT).ok();
    }
    is_live_file(name).then_some(today)
}

/// Returns true if the name ends exactly in `.txt` or `.log`, marking the file
/// still being written today.
pub fn is_live_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".txt") || lower.ends_with(".log")
}

/// Extracts the timestamp at the start of a log line.
///
/// Only the timestamp text is returned, not the rest of the line.
pub fn extract_timestamp(line: &str) -> Option<&str> {
    // Cheap rejection before any regex work
    if line.len() < 4 || !line.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    TIMESTAMP_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(line))
        .map(|m| m.as_str())
}

/// Recovers a date from a stored timestamp string.
pub fn date_from_timestamp(timestamp: &str) -> Option<NaiveDate> {
    let timestamp = timestamp.trim();
    if timestamp.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(timestamp, format)
            .ok()
            .map(|dt| dt.date())
    })
}

/// Formats a date as the stored `yyyyMMdd` field value.
pub fn to_file_date(date: NaiveDate) -> String {
    date.format(FILE_DATE_FORMAT).to_string()
}

/// Parses a stored `file_date` value. Anything other than 8 digits forming a real
/// date yields `None`.
pub fn parse_file_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, FILE_DATE_FORMAT).ok()
}

/// Converts a filesystem timestamp to a local date.
pub fn date_from_system_time(time: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

/// Formats a date for display.
pub fn format_date(date: Option<NaiveDate>) -> String {
    format_date_on(date, today())
}

/// Like [`format_date`], with an explicit value for today.
pub fn format_date_on(date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(date) = date else {
        return String::from("unknown");
    };
    if date == today {
        String::from("today")
    } else if today.checked_sub_days(Days::new(1)) == Some(date) {
        String::from("yesterday")
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

/// Inclusive range of file dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range from `start` to `end`, both inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range covering the last `days` days, ending today. `days = 1` covers today only.
    pub fn last_days(days: u32) -> Self {
        let end = today();
        let back = u64::from(days.saturating_sub(1));
        let start = end.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Returns true if `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dated_suffix_without_dot() {
        let today = ymd(2026, 3, 1);
        assert_eq!(
            parse_date_from_file_name_on("AB1B_Escalator.txt20251214", today),
            Some(ymd(2025, 12, 14))
        );
        assert_eq!(
            parse_date_from_file_name_on("app.log20250101", today),
            Some(ymd(2025, 1, 1))
        );
    }

    #[test]
    fn dated_suffix_with_dot() {
        let today = ymd(2026, 3, 1);
        assert_eq!(
            parse_date_from_file_name_on("app.txt.20251214", today),
            Some(ymd(2025, 12, 14))
        );
    }

    #[test]
    fn marker_is_case_insensitive() {
        let today = ymd(2026, 3, 1);
        assert_eq!(
            parse_date_from_file_name_on("APP.LOG20240229", today),
            Some(ymd(2024, 2, 29))
        );
        assert_eq!(parse_date_from_file_name_on("App.TXT", today), Some(today));
    }

    #[test]
    fn invalid_calendar_date_is_none() {
        let today = ymd(2026, 3, 1);
        assert_eq!(parse_date_from_file_name_on("app.txt20251314", today), None);
        assert_eq!(parse_date_from_file_name_on("app.log20250230", today), None);
    }

    #[test]
    fn live_file_is_today() {
        let today = ymd(2026, 3, 1);
        assert_eq!(parse_date_from_file_name_on("app.txt", today), Some(today));
        assert_eq!(parse_date_from_file_name_on("app.log", today), Some(today));
        assert!(is_live_file("app.log"));
        assert!(!is_live_file("app.log20250101"));
    }

    #[test]
    fn other_names_have_no_date() {
        let today = ymd(2026, 3, 1);
        assert_eq!(parse_date_from_file_name_on("app.txt.bak", today), None);
        assert_eq!(parse_date_from_file_name_on("app.log2025", today), None);
        assert_eq!(parse_date_from_file_name_on("", today), None);
    }

    #[test]
    fn extracts_each_timestamp_format() {
        assert_eq!(
            extract_timestamp("2025-01-15 10:30:45 door open"),
            Some("2025-01-15 10:30:45")
        );
        assert_eq!(
            extract_timestamp("2025/01/15 10:30:45 door open"),
            Some("2025/01/15 10:30:45")
        );
        assert_eq!(
            extract_timestamp("20250115 10:30:45 door open"),
            Some("20250115 10:30:45")
        );
        assert_eq!(
            extract_timestamp("2025-01-15T10:30:45.123Z door open"),
            Some("2025-01-15T10:30:45")
        );
    }

    #[test]
    fn no_timestamp_unless_line_starts_with_digit() {
        assert_eq!(extract_timestamp("[2025-01-15 10:30:45] x"), None);
        assert_eq!(extract_timestamp("  2025-01-15 10:30:45"), None);
        assert_eq!(extract_timestamp("電梯 2025-01-15 10:30:45"), None);
        assert_eq!(extract_timestamp("123"), None);
        assert_eq!(extract_timestamp("12345 not a time"), None);
    }

    #[test]
    fn file_date_round_trip() {
        assert_eq!(to_file_date(ymd(2025, 12, 14)), "20251214");
        assert_eq!(parse_file_date("20251214"), Some(ymd(2025, 12, 14)));
        assert_eq!(parse_file_date("2025121"), None);
        assert_eq!(parse_file_date("2025-12-14"), None);
        assert_eq!(parse_file_date("20251332"), None);
    }

    #[test]
    fn timestamp_fallback_formats() {
        assert_eq!(
            date_from_timestamp("2025-01-15 10:30:45"),
            Some(ymd(2025, 1, 15))
        );
        assert_eq!(
            date_from_timestamp("2025/01/15 10:30:45"),
            Some(ymd(2025, 1, 15))
        );
        assert_eq!(
            date_from_timestamp("20250115 10:30:45"),
            Some(ymd(2025, 1, 15))
        );
        assert_eq!(
            date_from_timestamp("2025-01-15T10:30:45"),
            Some(ymd(2025, 1, 15))
        );
        assert_eq!(date_from_timestamp(""), None);
        assert_eq!(date_from_timestamp("yesterday"), None);
    }

    #[test]
    fn display_format() {
        let today = ymd(2025, 6, 10);
        assert_eq!(format_date_on(None, today), "unknown");
        assert_eq!(format_date_on(Some(today), today), "today");
        assert_eq!(format_date_on(Some(ymd(2025, 6, 9)), today), "yesterday");
        assert_eq!(format_date_on(Some(ymd(2025, 6, 8)), today), "2025-06-08");
    }

    #[test]
    fn last_days_includes_today() {
        let range = DateRange::last_days(1);
        assert_eq!(range.start, range.end);
        assert_eq!(range.end, today());
        let range = DateRange::last_days(7);
        assert_eq!((range.end - range.start).num_days(), 6);
        let range = DateRange::last_days(0);
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = DateRange::new(ymd(2025, 1, 1), ymd(2025, 1, 3));
        assert!(range.contains(ymd(2025, 1, 1)));
        assert!(range.contains(ymd(2025, 1, 3)));
        assert!(!range.contains(ymd(2024, 12, 31)));
        assert!(!range.contains(ymd(2025, 1, 4)));
    }
}

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::text::normalize;

// 30.09.2025
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{4})").unwrap());
// 19:30
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());

/// Whether the text contains a `DD.MM.YYYY` pattern at all.
pub fn has_date(text: &str) -> bool {
    DATE_RE.is_match(text)
}

/// First `DD.MM.YYYY` in the text.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First `H:MM` / `HH:MM` in the text, e.g. "19:30 Uhr" or "19:30 v".
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Combines a date cell and a time cell into a naive local timestamp.
///
/// Returns `None` when the date cell has no valid date. A missing or
/// unparseable time yields midnight.
pub fn parse_datetime(date_text: &str, time_text: Option<&str>) -> Option<NaiveDateTime> {
    let date = parse_date(&normalize(date_text))?;
    let time_text = time_text.map(normalize).unwrap_or_default();
    let time = parse_time(&time_text).unwrap_or_else(|| {
        if !time_text.is_empty() {
            debug!(time = %time_text, "Unrecognized time, using midnight");
        }
        NaiveTime::MIN
    });
    Some(date.and_time(time))
}

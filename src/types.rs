use chrono::NaiveDateTime;
use serde::Serialize;

/// One fixture from the schedule, ready for calendar export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: String,
    pub location: String,
    pub all_day: bool,
    pub private: bool,
}

/// A Google Calendar import row; field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarRow {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "All Day Event")]
    pub all_day_event: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Private")]
    pub private: String,
}

fn format_date(dt: &NaiveDateTime) -> String {
    dt.format("%m/%d/%Y").to_string()
}

fn format_time(dt: &NaiveDateTime) -> String {
    dt.format("%H:%M").to_string()
}

fn format_flag(flag: bool) -> String {
    let s = if flag { "True" } else { "False" };
    s.to_string()
}

impl MatchRecord {
    pub fn to_calendar_row(&self) -> CalendarRow {
        CalendarRow {
            subject: self.subject.clone(),
            start_date: format_date(&self.start),
            start_time: format_time(&self.start),
            end_date: format_date(&self.end),
            end_time: format_time(&self.end),
            all_day_event: format_flag(self.all_day),
            description: self.description.clone(),
            location: self.location.clone(),
            private: format_flag(self.private),
        }
    }
}

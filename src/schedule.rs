use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::config::ExportOptions;
use crate::constants::{FRAGMENT_SEPARATOR, MIN_ROW_CELLS, SCHEDULE_NOT_FOUND};
use crate::datetime::{has_date, parse_datetime};
use crate::error::{Result, ScraperError};
use crate::section::{find_schedule_tables, heading_text};
use crate::text::element_text;
use crate::types::MatchRecord;
use crate::venue::{FallbackReason, VenueEnricher};

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static SCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+:\d+").unwrap());

// Column layout: Tag, Datum, Zeit, Sporthalle, Nr., Heim, Gast, Spiele
const DATE_COL: usize = 1;
const TIME_COL: usize = 2;
const VENUE_COL: usize = 3;
const NUMBER_COL: usize = 4;
const HOME_COL: usize = 5;
const AWAY_COL: usize = 6;
const RESULT_COL: usize = 7;

/// Records from a team portrait page plus what was dropped along the way.
#[derive(Debug, Default)]
pub struct ParsedSchedule {
    pub records: Vec<MatchRecord>,
    pub tables: usize,
    pub skipped_rows: usize,
    pub venue_fallbacks: usize,
}

/// A single schedule row turned into a record.
#[derive(Debug)]
pub struct ParsedRow {
    pub record: MatchRecord,
    /// Set when a hall link was followed but no address came back
    pub venue_fallback: Option<FallbackReason>,
}

pub struct ScheduleParser<'a> {
    page_url: &'a str,
    options: &'a ExportOptions,
    enricher: Option<&'a VenueEnricher<'a>>,
}

impl<'a> ScheduleParser<'a> {
    pub fn new(
        page_url: &'a str,
        options: &'a ExportOptions,
        enricher: Option<&'a VenueEnricher<'a>>,
    ) -> Self {
        Self {
            page_url,
            options,
            enricher,
        }
    }

    /// Parses both "Spieltermine" tables; fails if the page has none.
    #[instrument(skip(self, html), fields(url = %self.page_url))]
    pub fn parse_page(&self, html: &str) -> Result<ParsedSchedule> {
        let document = Html::parse_document(html);
        let tables = find_schedule_tables(&document);
        if tables.is_empty() {
            return Err(ScraperError::Structure(SCHEDULE_NOT_FOUND.to_string()));
        }
        info!("Found {} schedule tables", tables.len());

        let mut schedule = ParsedSchedule {
            tables: tables.len(),
            ..Default::default()
        };
        for table in tables {
            debug!(section = %heading_text(table.heading), "Parsing schedule table");
            for row in table.element.select(&ROW_SELECTOR) {
                match self.parse_row(row) {
                    Some(parsed) => {
                        if parsed.venue_fallback.is_some() {
                            schedule.venue_fallbacks += 1;
                        }
                        schedule.records.push(parsed.record);
                    }
                    None => schedule.skipped_rows += 1,
                }
            }
        }

        info!(
            records = schedule.records.len(),
            skipped = schedule.skipped_rows,
            "Parsed schedule rows"
        );
        if schedule.venue_fallbacks > 0 {
            warn!("{} venues fell back to the short code", schedule.venue_fallbacks);
        }
        Ok(schedule)
    }

    /// `None` for header, spacer and other rows without a date.
    pub fn parse_row(&self, row: ElementRef<'_>) -> Option<ParsedRow> {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < MIN_ROW_CELLS {
            return None;
        }

        let text_at = |idx: usize| {
            cells
                .get(idx)
                .map(|c| element_text(*c))
                .unwrap_or_default()
        };
        let date_text = text_at(DATE_COL);
        let time_text = text_at(TIME_COL);
        let venue_cell = cells[VENUE_COL];
        let number = text_at(NUMBER_COL);
        let home = text_at(HOME_COL);
        let away = text_at(AWAY_COL);
        let result = text_at(RESULT_COL);

        if !has_date(&date_text) {
            return None;
        }

        let time_text = if time_text.is_empty() {
            self.options.default_time.as_str()
        } else {
            time_text.as_str()
        };
        let Some(start) = parse_datetime(&date_text, Some(time_text)) else {
            debug!(date = %date_text, "Date pattern is not a calendar date, skipping row");
            return None;
        };
        let end = start + Duration::minutes(i64::from(self.options.duration_minutes));

        let (location, venue_fallback) = match self.enricher {
            Some(enricher) => {
                let resolution = enricher.resolve(venue_cell, self.page_url);
                // Plain-text venues have nothing to look up
                let reason = resolution
                    .fallback_reason()
                    .filter(|r| *r != FallbackReason::NoLink);
                (resolution.location().to_string(), reason)
            }
            None => (element_text(venue_cell), None),
        };

        let record = MatchRecord {
            subject: format!("{home} vs. {away}"),
            start,
            end,
            description: describe(&number, &result),
            location,
            all_day: false,
            private: false,
        };
        Some(ParsedRow {
            record,
            venue_fallback,
        })
    }
}

/// "Spiel Nr.: 12 | Ergebnis: 3:1", leaving out whatever is missing.
pub fn describe(number: &str, result: &str) -> String {
    let mut parts = Vec::new();
    if !number.is_empty() {
        parts.push(format!("Spiel Nr.: {number}"));
    }
    if let Some(score) = SCORE_RE.find(result) {
        parts.push(format!("Ergebnis: {}", score.as_str()));
    }
    parts.join(FRAGMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::PageFetcher;
    use crate::types::CalendarRow;

    const PAGE_URL: &str = "https://example.org/teamPortrait";

    fn options(duration_minutes: u32) -> ExportOptions {
        ExportOptions {
            duration_minutes,
            enrich_venues: false,
            ..Default::default()
        }
    }

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
                 <h2>Spieltermine (Vorrunde)</h2>
                 <table>
                   <tr><th>Tag</th><th>Datum</th><th>Zeit</th><th>Halle</th><th>Nr.</th>
                       <th>Heimmannschaft</th><th>Gastmannschaft</th><th>Spiele</th></tr>
                   {rows}
                 </table>
               </body></html>"#
        )
    }

    fn parse(rows: &str, duration: u32) -> ParsedSchedule {
        let opts = options(duration);
        let parser = ScheduleParser::new(PAGE_URL, &opts, None);
        parser.parse_page(&page(rows)).unwrap()
    }

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!("<tr>{tds}</tr>")
    }

    /// Refuses every request; rows must not need the network.
    struct OfflineFetcher;

    impl PageFetcher for OfflineFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            panic!("unexpected fetch of {url}");
        }
    }

    /// Answers every request with a 404.
    struct MissingPageFetcher;

    impl PageFetcher for MissingPageFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            Err(ScraperError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn parse_enriched(rows: &str, fetcher: &dyn PageFetcher) -> ParsedSchedule {
        let opts = ExportOptions::default();
        let enricher = VenueEnricher::new(fetcher);
        let parser = ScheduleParser::new(PAGE_URL, &opts, Some(&enricher));
        parser.parse_page(&page(rows)).unwrap()
    }

    #[test]
    fn test_reference_row() {
        let schedule = parse(
            &row(&[
                "Fr",
                "03.10.2025",
                "19:30 Uhr",
                "<a href=\"/hall\">TU</a>",
                "12",
                "Team A",
                "Team B",
                "3:1",
            ]),
            90,
        );
        assert_eq!(schedule.records.len(), 1);
        let r = schedule.records[0].to_calendar_row();
        assert_eq!(
            r,
            CalendarRow {
                subject: "Team A vs. Team B".to_string(),
                start_date: "10/03/2025".to_string(),
                start_time: "19:30".to_string(),
                end_date: "10/03/2025".to_string(),
                end_time: "21:00".to_string(),
                all_day_event: "False".to_string(),
                description: "Spiel Nr.: 12 | Ergebnis: 3:1".to_string(),
                location: "TU".to_string(),
                private: "False".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_time_uses_default_start() {
        let schedule = parse(&row(&["Sa", "04.10.2025", "", "LY", "13", "A", "B", ""]), 120);
        let r = schedule.records[0].to_calendar_row();
        assert_eq!(r.start_time, "19:30");
        assert_eq!(r.end_time, "21:30");
    }

    #[test]
    fn test_unparseable_time_is_midnight() {
        let schedule = parse(
            &row(&["Sa", "04.10.2025", "offen", "LY", "13", "A", "B", ""]),
            120,
        );
        assert_eq!(schedule.records[0].to_calendar_row().start_time, "00:00");
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let schedule = parse(&row(&["Fr", "03.10.2025", "19:30", "TU", "12", "Team A"]), 120);
        assert!(schedule.records.is_empty());
        // header row + short row
        assert_eq!(schedule.skipped_rows, 2);
    }

    #[test]
    fn test_rows_without_date_are_skipped() {
        let rows = [
            row(&["", "Rückrunde", "", "", "", "", "", ""]),
            row(&["Fr", "3.10.2025", "19:30", "TU", "12", "Team A", "Team B", "3:1"]),
            row(&["Fr", "tba", "19:30", "TU", "12", "Team A", "Team B", "3:1"]),
        ]
        .concat();
        assert!(parse(&rows, 120).records.is_empty());
    }

    #[test]
    fn test_seven_cells_is_enough() {
        let schedule = parse(
            &row(&["Fr", "03.10.2025", "19:30", "TU", "", "Team A", "Team B"]),
            120,
        );
        let record = &schedule.records[0];
        assert_eq!(record.subject, "Team A vs. Team B");
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_blank_teams_still_emit_subject() {
        let schedule = parse(&row(&["Fr", "03.10.2025", "19:30", "TU", "12", "", "", ""]), 120);
        assert_eq!(schedule.records[0].subject, " vs. ");
    }

    #[test]
    fn test_end_is_start_plus_duration() {
        for duration in [0, 1, 90, 120, 24 * 60 + 5] {
            let schedule = parse(
                &row(&["Fr", "03.10.2025", "23:30", "TU", "1", "A", "B", ""]),
                duration,
            );
            let record = &schedule.records[0];
            assert_eq!(
                record.end - record.start,
                Duration::minutes(i64::from(duration))
            );
        }
    }

    #[test]
    fn test_plain_venue_is_not_a_fallback() {
        let schedule = parse_enriched(
            &row(&["Fr", "03.10.2025", "19:30", "LY", "12", "A", "B", ""]),
            &OfflineFetcher,
        );
        assert_eq!(schedule.records[0].location, "LY");
        assert_eq!(schedule.venue_fallbacks, 0);
    }

    #[test]
    fn test_failed_hall_lookup_is_a_fallback() {
        let rows = [
            row(&["Fr", "03.10.2025", "19:30", "<a href=\"/hall\">TU</a>", "12", "A", "B", ""]),
            row(&["Sa", "04.10.2025", "19:30", "LY", "13", "B", "A", ""]),
        ]
        .concat();
        let schedule = parse_enriched(&rows, &MissingPageFetcher);
        let locations: Vec<_> = schedule.records.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["TU", "LY"]);
        assert_eq!(schedule.venue_fallbacks, 1);
    }

    #[test]
    fn test_tables_in_document_order() {
        let html = r#"<html><body>
            <h2>Spieltermine Vorrunde</h2>
            <table><tr><td>Sa</td><td>20.09.2025</td><td>18:00</td><td>TU</td>
                       <td>1</td><td>A</td><td>B</td><td>1:3</td></tr></table>
            <h2>Spieltermine Rückrunde</h2>
            <table><tr><td>Sa</td><td>17.01.2026</td><td>18:00</td><td>TU</td>
                       <td>9</td><td>B</td><td>A</td><td></td></tr></table>
        </body></html>"#;
        let opts = options(120);
        let parser = ScheduleParser::new(PAGE_URL, &opts, None);
        let schedule = parser.parse_page(html).unwrap();
        assert_eq!(schedule.tables, 2);
        let subjects: Vec<_> = schedule.records.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["A vs. B", "B vs. A"]);
    }

    #[test]
    fn test_missing_tables_is_structure_error() {
        let opts = options(120);
        let parser = ScheduleParser::new(PAGE_URL, &opts, None);
        let err = parser.parse_page("<h2>Tabelle</h2><table></table>").unwrap_err();
        match err {
            ScraperError::Structure(msg) => assert_eq!(msg, SCHEDULE_NOT_FOUND),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("12", "3:1"), "Spiel Nr.: 12 | Ergebnis: 3:1");
        assert_eq!(describe("", "6:2 (Wertung)"), "Ergebnis: 6:2");
        assert_eq!(describe("7", "abgesagt"), "Spiel Nr.: 7");
        assert_eq!(describe("", ""), "");
    }
}

use std::path::{Path, PathBuf};

use tracing::{info, info_span};

use crate::config::ExportOptions;
use crate::csv_export::write_csv;
use crate::error::Result;
use crate::http_client::PageFetcher;
use crate::schedule::{ParsedSchedule, ScheduleParser};
use crate::venue::VenueEnricher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub records: usize,
    pub tables: usize,
    pub skipped_rows: usize,
    pub venue_fallbacks: usize,
    pub output: PathBuf,
}

pub struct Pipeline;

impl Pipeline {
    /// Fetches the team portrait page and parses its schedule.
    pub fn scrape(
        fetcher: &dyn PageFetcher,
        url: &str,
        options: &ExportOptions,
    ) -> Result<ParsedSchedule> {
        let html = fetcher.fetch(url)?;
        let enricher = VenueEnricher::new(fetcher);
        let enricher = options.enrich_venues.then_some(&enricher);
        ScheduleParser::new(url, options, enricher).parse_page(&html)
    }

    /// Fetch, parse and write in one go.
    pub fn run(
        fetcher: &dyn PageFetcher,
        url: &str,
        output: &Path,
        options: &ExportOptions,
    ) -> Result<ExportSummary> {
        let span = info_span!("export", %url);
        let _enter = span.enter();

        info!(enrich = options.enrich_venues, "Starting export");
        let schedule = Self::scrape(fetcher, url, options)?;
        write_csv(&schedule.records, output)?;

        Ok(ExportSummary {
            records: schedule.records.len(),
            tables: schedule.tables,
            skipped_rows: schedule.skipped_rows,
            venue_fallbacks: schedule.venue_fallbacks,
            output: output.to_path_buf(),
        })
    }
}

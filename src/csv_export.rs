use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::constants::CSV_COLUMNS;
use crate::error::Result;
use crate::types::MatchRecord;

/// Writes the header and one row per record to any writer.
pub fn write_records<W: Write>(records: &[MatchRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        // serde only emits the header alongside the first row
        wtr.write_record(CSV_COLUMNS)?;
    }
    for record in records {
        wtr.serialize(record.to_calendar_row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Creates or truncates `path` and writes all records to it.
#[instrument(skip(records), fields(records = records.len()))]
pub fn write_csv(records: &[MatchRecord], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_records(records, file)?;
    info!(path = %path.display(), "Wrote calendar CSV");
    Ok(())
}

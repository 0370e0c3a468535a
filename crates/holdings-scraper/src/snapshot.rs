use chrono::{DateTime, TimeZone};
use csv::WriterBuilder;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{HoldingsTable, ScrapeError};

/// `prefix_YYYYMMDD_HHMMSS.csv`
pub fn snapshot_file_name<Tz>(prefix: &str, captured_at: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}_{}.csv", prefix, captured_at.format("%Y%m%d_%H%M%S"))
}

/// Write the table into `dir` under a capture-time file name and return the path.
pub fn write_snapshot<Tz>(
    table: &HoldingsTable,
    dir: &Path,
    prefix: &str,
    captured_at: DateTime<Tz>,
) -> Result<PathBuf, ScrapeError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_file_name(prefix, captured_at));

    let mut writer = WriterBuilder::new().flexible(true).from_path(&path)?;
    if !table.headers.is_empty() {
        writer.write_record(&table.headers)?;
    }
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(path)
}

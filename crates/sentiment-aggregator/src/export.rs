use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::path::Path;

use crate::pipeline::AggregateReport;

/// Write the daily series as `date,positive,negative,neutral`.
pub fn write_counts_csv(report: &AggregateReport, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["date", "positive", "negative", "neutral"])?;
    for day in &report.days {
        writer.write_record([
            day.date.format("%Y-%m-%d").to_string(),
            day.counts.positive.to_string(),
            day.counts.negative.to_string(),
            day.counts.neutral.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::{DailySentiment, SentimentCounts};
    use chrono::NaiveDate;

    #[test]
    fn test_write_counts_csv() {
        let report = AggregateReport {
            ticker: "CRWD".to_string(),
            days: vec![
                DailySentiment {
                    date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                    counts: SentimentCounts::new(2, 0, 0),
                },
                DailySentiment::empty(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()),
            ],
            failed_windows: vec![],
        };

        let path = std::env::temp_dir().join(format!("sentiment_counts_{}.csv", std::process::id()));
        write_counts_csv(&report, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "date,positive,negative,neutral\n2023-01-01,2,0,0\n2023-01-02,0,0,0\n"
        );
        let _ = std::fs::remove_file(path);
    }
}

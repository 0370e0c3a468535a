//! sentiment-aggregator: per-day counts of provider sentiment insights for a
//! ticker, fetched in rate-limited weekly windows and charted over time.

pub mod chart;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod tally;
pub mod windows;

pub use chart::{generate_chart, open_in_viewer};
pub use config::AggregatorConfig;
pub use export::write_counts_csv;
pub use pipeline::{AggregateReport, SentimentAggregator};
pub use tally::{tally_window, DailySentiment, SentimentCounts};
pub use windows::{date_windows, DateWindow};

use market_core::{Clock, NewsSource};
use std::sync::Arc;

/// Aggregate, then write the chart (and optional CSV) described by `config`.
pub async fn run<S: NewsSource>(
    source: S,
    config: &AggregatorConfig,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<AggregateReport> {
    let aggregator = SentimentAggregator::new(source, config, clock);
    let report = aggregator.run(&config.ticker, config.start, config.end).await?;

    let totals = report.totals();
    tracing::info!(
        "{}: {} days, {} positive / {} negative / {} neutral insights",
        report.ticker,
        report.days.len(),
        totals.positive,
        totals.negative,
        totals.neutral
    );
    if !report.failed_windows.is_empty() {
        tracing::warn!(
            "{} window(s) could not be fetched and are zero-filled: {}",
            report.failed_windows.len(),
            report
                .failed_windows
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if let Some(csv_path) = &config.csv_path {
        write_counts_csv(&report, csv_path)?;
        tracing::info!("Daily counts saved to {}", csv_path.display());
    }

    let chart_path = generate_chart(&report, &config.chart_path).await?;
    tracing::info!("Chart saved to {}", chart_path.display());
    if config.show_chart {
        open_in_viewer(&chart_path);
    }

    Ok(report)
}

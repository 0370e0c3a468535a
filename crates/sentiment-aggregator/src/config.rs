use chrono::NaiveDate;
use market_core::cli::{date_flag, flag_value, has_flag};
use market_core::MarketError;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub ticker: String,
    pub start: NaiveDate,
    /// Exclusive
    pub end: NaiveDate,
    pub window_days: u32,
    /// Article cap per window request
    pub item_limit: u32,
    /// Window requests allowed per `call_interval`
    pub calls_per_interval: usize,
    pub call_interval: Duration,
    pub error_delay: Duration,
    pub max_window_attempts: u32,
    pub chart_path: PathBuf,
    pub csv_path: Option<PathBuf>,
    pub show_chart: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            ticker: "CRWD".to_string(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 4, 4).unwrap_or_default(),
            window_days: 7,
            item_limit: 1000,
            // Free tier: 5 calls per minute
            calls_per_interval: 1,
            call_interval: Duration::from_secs(12),
            error_delay: Duration::from_secs(60),
            max_window_attempts: 3,
            chart_path: PathBuf::from("sentiment_over_time.png"),
            csv_path: None,
            show_chart: true,
        }
    }
}

impl AggregatorConfig {
    /// Defaults overridden by command-line flags:
    /// `--ticker`, `--from`, `--to`, `--window-days`, `--limit`, `--attempts`,
    /// `--out`, `--csv`, `--no-show`.
    pub fn from_args(args: &[String]) -> Result<Self, MarketError> {
        let defaults = Self::default();

        let parse_num = |name: &str, default: u32| -> Result<u32, MarketError> {
            match flag_value(args, name) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| MarketError::Config(format!("{} expects a number, got '{}'", name, raw))),
                None => Ok(default),
            }
        };

        let config = Self {
            ticker: flag_value(args, "--ticker")
                .map(|t| t.to_uppercase())
                .unwrap_or(defaults.ticker),
            start: date_flag(args, "--from", defaults.start)?,
            end: date_flag(args, "--to", defaults.end)?,
            window_days: parse_num("--window-days", defaults.window_days)?,
            item_limit: parse_num("--limit", defaults.item_limit)?,
            max_window_attempts: parse_num("--attempts", defaults.max_window_attempts)?.max(1),
            chart_path: flag_value(args, "--out").map(PathBuf::from).unwrap_or(defaults.chart_path),
            csv_path: flag_value(args, "--csv").map(PathBuf::from),
            show_chart: !has_flag(args, "--no-show"),
            ..defaults
        };

        if config.start >= config.end {
            return Err(MarketError::InvalidRange(format!(
                "start {} must be before end {}",
                config.start, config.end
            )));
        }
        Ok(config)
    }
}

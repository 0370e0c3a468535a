use chrono::NaiveDate;
use market_core::cli::{date_flag, flag_value};
use market_core::MarketError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub ticker: String,
    pub start: NaiveDate,
    /// Exclusive
    pub end: NaiveDate,
    /// Most recent articles to classify
    pub item_limit: u32,
    /// Classifications allowed per `call_interval`, shared by both APIs
    pub calls_per_interval: usize,
    pub call_interval: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ticker: "TSLA".to_string(),
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 4, 12).unwrap_or_default(),
            item_limit: 100,
            calls_per_interval: 1,
            call_interval: Duration::from_secs(12),
        }
    }
}

impl ClassifierConfig {
    /// Defaults overridden by `--ticker`, `--from`, `--to` and `--limit`.
    pub fn from_args(args: &[String]) -> Result<Self, MarketError> {
        let defaults = Self::default();

        let item_limit = match flag_value(args, "--limit") {
            Some(raw) => raw
                .parse()
                .map_err(|_| MarketError::Config(format!("--limit expects a number, got '{}'", raw)))?,
            None => defaults.item_limit,
        };

        let config = Self {
            ticker: flag_value(args, "--ticker")
                .map(|t| t.to_uppercase())
                .unwrap_or(defaults.ticker),
            start: date_flag(args, "--from", defaults.start)?,
            end: date_flag(args, "--to", defaults.end)?,
            item_limit,
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

//! Minimal `--flag value` argument handling shared by the pipeline binaries.

use chrono::NaiveDate;
use crate::MarketError;

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

pub fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

/// Parse `--name YYYY-MM-DD`, falling back to `default` when the flag is absent.
pub fn date_flag(args: &[String], name: &str, default: NaiveDate) -> Result<NaiveDate, MarketError> {
    match flag_value(args, name) {
        Some(raw) => parse_date(raw),
        None => Ok(default),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, MarketError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| MarketError::Config(format!("invalid date '{}': {}", raw, e)))
}

/// Read a required environment variable, treating an empty value as missing.
pub fn required_env(name: &str) -> Result<String, MarketError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(MarketError::Config(format!("{} must be set", name))),
    }
}

//! holdings-scraper: capture the first table of a public holdings page as a
//! timestamped CSV snapshot.

pub mod config;
pub mod snapshot;
pub mod table;

pub use config::ScraperConfig;
pub use snapshot::{snapshot_file_name, write_snapshot};
pub use table::{extract_first_table, HoldingsTable};

use chrono::Local;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Error fetching the webpage: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Row {row} has {found} cells but the table has {expected} headers")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, ua);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

pub fn build_client(config: &ScraperConfig) -> Result<reqwest::Client, ScrapeError> {
    Ok(reqwest::Client::builder()
        .default_headers(browser_headers(&config.user_agent))
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// GET the page body, failing on transport errors and non-2xx statuses.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, ScrapeError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Fetch, extract and persist one snapshot. `Ok(None)` means the page had no table.
pub async fn run(config: &ScraperConfig) -> Result<Option<PathBuf>, ScrapeError> {
    let client = build_client(config)?;

    tracing::info!("Fetching {}", config.url);
    let html = fetch_page(&client, &config.url).await?;

    let table = match extract_first_table(&html)? {
        Some(table) => table,
        None => {
            tracing::warn!("No table found on the page");
            return Ok(None);
        }
    };

    tracing::info!(
        "Parsed table with {} columns and {} rows",
        table.headers.len(),
        table.rows.len()
    );

    let path = write_snapshot(&table, &config.output_dir, &config.file_prefix, Local::now())?;
    tracing::info!("Data successfully scraped and saved to {}", path.display());
    Ok(Some(path))
}

//! holdings-scraper: snapshot the first table of a holdings page to CSV.
//!
//! Usage:
//!   cargo run -p holdings-scraper
//!   cargo run -p holdings-scraper -- --url https://www.dataroma.com/m/rt.php --out-dir captures

use anyhow::Context;
use holdings_scraper::ScraperConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holdings_scraper=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ScraperConfig::from_args(&args);

    match holdings_scraper::run(&config)
        .await
        .with_context(|| format!("scraping {} failed", config.url))?
    {
        Some(path) => println!("{}", path.display()),
        None => tracing::info!("Nothing written"),
    }

    Ok(())
}

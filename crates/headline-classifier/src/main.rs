//! headline-classifier: print a model-derived sentiment for each recent headline.
//!
//! Usage:
//!   cargo run -p headline-classifier
//!   cargo run -p headline-classifier -- --ticker TSLA --from 2025-03-01 --to 2025-04-12 --limit 100

use anyhow::Context;
use gemini_client::{GeminiClient, GeminiConfig};
use headline_classifier::{ClassifierConfig, HeadlineClassifier};
use market_core::cli::required_env;
use market_core::TokioClock;
use polygon_client::PolygonClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "headline_classifier=info,polygon_client=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ClassifierConfig::from_args(&args).context("invalid arguments")?;

    let polygon = PolygonClient::new(required_env("POLYGON_API_KEY")?);
    let gemini = GeminiClient::new(GeminiConfig::new(required_env("GOOGLE_API_KEY")?))?;
    tracing::info!("Using model {}", gemini.model());

    let classifier = HeadlineClassifier::new(polygon, gemini, &config, Arc::new(TokioClock));

    let mut stdout = std::io::stdout();
    let results = classifier
        .run(&config.ticker, config.start, config.end, &mut stdout)
        .await
        .with_context(|| format!("fetching {} news failed", config.ticker))?;

    tracing::info!("Classified {} headlines", results.len());
    Ok(())
}

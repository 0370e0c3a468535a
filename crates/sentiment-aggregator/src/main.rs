//! sentiment-aggregator: chart daily Polygon news sentiment insights for a ticker.
//!
//! Usage:
//!   cargo run -p sentiment-aggregator
//!   cargo run -p sentiment-aggregator -- --ticker CRWD --from 2023-01-01 --to 2025-04-04
//!   cargo run -p sentiment-aggregator -- --ticker TSLA --csv tsla.csv --no-show

use anyhow::Context;
use market_core::cli::required_env;
use market_core::TokioClock;
use polygon_client::PolygonClient;
use sentiment_aggregator::AggregatorConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentiment_aggregator=info,polygon_client=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = AggregatorConfig::from_args(&args).context("invalid arguments")?;
    let api_key = required_env("POLYGON_API_KEY")?;

    let polygon = PolygonClient::new(api_key);
    sentiment_aggregator::run(polygon, &config, Arc::new(TokioClock)).await?;

    Ok(())
}

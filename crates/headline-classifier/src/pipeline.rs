use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use market_core::{
    Clock, MarketError, NewsQuery, NewsSource, RateLimiter, SentimentLabel, SortOrder, TextGenerator,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::classify::classify_headline;
use crate::config::ClassifierConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedHeadline {
    pub ticker: String,
    pub published_utc: DateTime<Utc>,
    pub title: String,
    pub sentiment: SentimentLabel,
    pub fell_back: bool,
}

impl fmt::Display for ClassifiedHeadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "{} - {}",
            self.ticker,
            self.published_utc.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Sentiment: {}", self.sentiment)?;
        write!(f, "---")
    }
}

/// Classifies recent headlines one at a time, pacing each model call.
pub struct HeadlineClassifier<S: NewsSource, G: TextGenerator> {
    source: S,
    generator: G,
    limiter: RateLimiter,
    item_limit: u32,
}

impl<S: NewsSource, G: TextGenerator> HeadlineClassifier<S, G> {
    pub fn new(source: S, generator: G, config: &ClassifierConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            generator,
            limiter: RateLimiter::new(config.calls_per_interval, config.call_interval, clock),
            item_limit: config.item_limit,
        }
    }

    /// Fetch the newest articles in the range and classify each in API order,
    /// writing one block per article to `out`.
    ///
    /// A failed fetch ends the run with an error. Per-article failures fall back
    /// to Neutral and never stop the loop.
    pub async fn run<W: Write>(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        out: &mut W,
    ) -> Result<Vec<ClassifiedHeadline>, MarketError> {
        let query = NewsQuery::new(ticker, start, end)
            .with_limit(self.item_limit)
            .with_order(SortOrder::Desc);

        let articles = self.source.fetch_news(&query).await?;
        tracing::info!("Classifying {} {} headlines", articles.len(), ticker);

        let mut results = Vec::with_capacity(articles.len());
        for article in &articles {
            self.limiter.acquire().await;
            let verdict = classify_headline(&self.generator, ticker, article).await;

            let classified = ClassifiedHeadline {
                ticker: ticker.to_string(),
                published_utc: article.published_utc,
                title: article.title.clone(),
                sentiment: verdict.label,
                fell_back: verdict.fell_back,
            };

            if let Err(e) = writeln!(out, "{}", classified) {
                tracing::warn!("Processing error writing result: {}", e);
            }
            results.push(classified);
        }

        let fallbacks = results.iter().filter(|r| r.fell_back).count();
        if fallbacks > 0 {
            tracing::warn!("{} of {} headlines defaulted to Neutral", fallbacks, results.len());
        }
        Ok(results)
    }
}

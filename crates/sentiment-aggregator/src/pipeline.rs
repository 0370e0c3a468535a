use chrono::NaiveDate;
use market_core::{Clock, MarketError, NewsQuery, NewsSource, RateLimiter, RetryPolicy, SortOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AggregatorConfig;
use crate::tally::{empty_window, tally_window, DailySentiment, SentimentCounts};
use crate::windows::{date_windows, DateWindow};

/// Daily series for one ticker plus the windows whose news could not be fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub ticker: String,
    pub days: Vec<DailySentiment>,
    pub failed_windows: Vec<DateWindow>,
}

impl AggregateReport {
    pub fn totals(&self) -> SentimentCounts {
        self.days.iter().fold(SentimentCounts::default(), |acc, d| SentimentCounts {
            positive: acc.positive + d.counts.positive,
            negative: acc.negative + d.counts.negative,
            neutral: acc.neutral + d.counts.neutral,
        })
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailySentiment> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Walks a date range window by window, one paced news request per window.
pub struct SentimentAggregator<S: NewsSource> {
    source: S,
    limiter: RateLimiter,
    retry: RetryPolicy,
    window_days: u32,
    item_limit: u32,
}

impl<S: NewsSource> SentimentAggregator<S> {
    pub fn new(source: S, config: &AggregatorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            limiter: RateLimiter::new(config.calls_per_interval, config.call_interval, clock),
            retry: RetryPolicy::fixed(config.max_window_attempts, config.error_delay),
            window_days: config.window_days,
            item_limit: config.item_limit,
        }
    }

    pub async fn run(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<AggregateReport, MarketError> {
        let windows = date_windows(start, end, self.window_days)?;
        tracing::info!("Aggregating {} sentiment over {} windows", ticker, windows.len());

        let mut report = AggregateReport {
            ticker: ticker.to_string(),
            days: Vec::with_capacity((end - start).num_days().max(0) as usize),
            failed_windows: Vec::new(),
        };

        for window in windows {
            match self.fetch_window(ticker, &window).await {
                Ok(days) => report.days.extend(days),
                Err(e) => {
                    tracing::error!("Dropping news for {} {}: {}", ticker, window, e);
                    report.days.extend(empty_window(&window));
                    report.failed_windows.push(window);
                }
            }
        }

        Ok(report)
    }

    /// Fetch and tally one window. Only transient errors are retried.
    async fn fetch_window(&self, ticker: &str, window: &DateWindow) -> Result<Vec<DailySentiment>, MarketError> {
        let query = NewsQuery::new(ticker, window.start, window.end)
            .with_limit(self.item_limit)
            .with_order(SortOrder::Asc);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.limiter.acquire().await;

            match self.source.fetch_news(&query).await {
                Ok(articles) => {
                    tracing::debug!("{}: {} articles", window, articles.len());
                    return Ok(tally_window(window, &articles));
                }
                Err(e) if e.is_transient() && self.retry.should_retry(attempt) => {
                    let wait = self.retry.delay_after(attempt);
                    tracing::warn!(
                        "Error processing batch {}: {}. Waiting {}s before attempt {}/{}",
                        window,
                        e,
                        wait.as_secs(),
                        attempt + 1,
                        self.retry.max_attempts
                    );
                    self.limiter.clock().sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use market_core::{ManualClock, NewsArticle, NewsInsight};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted responses, one per request, and records the queries.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<NewsArticle>, MarketError>>>,
        queries: Mutex<Vec<NewsQuery>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<NewsArticle>, MarketError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<NewsQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsSource for ScriptedSource {
        async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, MarketError> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn article(y: i32, m: u32, day: u32, sentiments: &[&str]) -> NewsArticle {
        NewsArticle {
            id: format!("{}-{}-{}", y, m, day),
            title: "CrowdStrike headline".to_string(),
            author: None,
            published_utc: Utc.with_ymd_and_hms(y, m, day, 15, 30, 0).unwrap(),
            article_url: String::new(),
            description: None,
            tickers: vec!["CRWD".to_string()],
            insights: sentiments
                .iter()
                .map(|s| NewsInsight {
                    ticker: "CRWD".to_string(),
                    sentiment: s.to_string(),
                    sentiment_reasoning: None,
                })
                .collect(),
        }
    }

    fn config() -> AggregatorConfig {
        AggregatorConfig {
            max_window_attempts: 2,
            ..AggregatorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_single_window_end_to_end() {
        let source = ScriptedSource::new(vec![Ok(vec![
            article(2023, 1, 1, &["positive"]),
            article(2023, 1, 1, &["positive"]),
            article(2023, 1, 5, &["negative"]),
        ])]);
        let clock = Arc::new(ManualClock::new());
        let aggregator = SentimentAggregator::new(source.clone(), &config(), clock.clone());

        let report = aggregator.run("CRWD", d(2023, 1, 1), d(2023, 1, 8)).await.unwrap();

        assert_eq!(report.days.len(), 7);
        assert!(report.failed_windows.is_empty());
        assert_eq!(report.day(d(2023, 1, 1)).unwrap().counts, SentimentCounts::new(2, 0, 0));
        assert_eq!(report.day(d(2023, 1, 5)).unwrap().counts, SentimentCounts::new(0, 1, 0));
        for day in [2, 3, 4, 6, 7] {
            assert_eq!(report.day(d(2023, 1, day)).unwrap().counts, SentimentCounts::default());
        }

        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].ticker, "CRWD");
        assert_eq!(queries[0].published_from, d(2023, 1, 1));
        assert_eq!(queries[0].published_to, d(2023, 1, 8));
        assert_eq!(queries[0].limit, 1000);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_every_day_present_and_ordered() {
        let source = ScriptedSource::new(vec![
            Ok(vec![]),
            Ok(vec![article(2023, 1, 10, &["neutral", "positive"])]),
            Ok(vec![]),
        ]);
        let aggregator = SentimentAggregator::new(source.clone(), &config(), Arc::new(ManualClock::new()));

        let report = aggregator.run("CRWD", d(2023, 1, 1), d(2023, 1, 20)).await.unwrap();

        assert_eq!(report.days.len(), 19);
        assert!(report.days.windows(2).all(|p| p[0].date.succ_opt() == Some(p[1].date)));
        assert_eq!(report.totals(), SentimentCounts::new(1, 0, 1));
        assert_eq!(source.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_windows_are_paced() {
        let source = ScriptedSource::new(vec![Ok(vec![]), Ok(vec![]), Ok(vec![])]);
        let clock = Arc::new(ManualClock::new());
        let aggregator = SentimentAggregator::new(source.clone(), &config(), clock.clone());

        aggregator.run("CRWD", d(2023, 1, 1), d(2023, 1, 22)).await.unwrap();

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(12), Duration::from_secs(12)]);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let source = ScriptedSource::new(vec![
            Err(MarketError::RequestFailed("connection reset".to_string())),
            Ok(vec![article(2023, 1, 3, &["negative"])]),
        ]);
        let clock = Arc::new(ManualClock::new());
        let aggregator = SentimentAggregator::new(source.clone(), &config(), clock.clone());

        let report = aggregator.run("CRWD", d(2023, 1, 1), d(2023, 1, 8)).await.unwrap();

        assert!(report.failed_windows.is_empty());
        assert_eq!(report.day(d(2023, 1, 3)).unwrap().counts, SentimentCounts::new(0, 1, 0));
        assert_eq!(source.queries().len(), 2);
        assert_eq!(clock.sleeps()[0], Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_failed_window_is_zero_filled_and_recorded() {
        let source = ScriptedSource::new(vec![
            Ok(vec![article(2023, 1, 2, &["positive"])]),
            Err(MarketError::ApiError { status: 500, body: "boom".to_string() }),
            Err(MarketError::ApiError { status: 500, body: "boom".to_string() }),
            Ok(vec![article(2023, 1, 16, &["neutral"])]),
        ]);
        let aggregator = SentimentAggregator::new(source.clone(), &config(), Arc::new(ManualClock::new()));

        let report = aggregator.run("CRWD", d(2023, 1, 1), d(2023, 1, 22)).await.unwrap();

        assert_eq!(report.days.len(), 21);
        assert_eq!(report.failed_windows, vec![DateWindow { start: d(2023, 1, 8), end: d(2023, 1, 15) }]);
        for day in 8..15 {
            assert_eq!(report.day(d(2023, 1, day)).unwrap().counts, SentimentCounts::default());
        }
        assert_eq!(report.totals(), SentimentCounts::new(1, 0, 1));
        // The cursor advanced past the failed window instead of retrying it forever
        assert_eq!(source.queries().len(), 4);
        assert_eq!(source.queries()[3].published_from, d(2023, 1, 15));
    }

    #[tokio::test]
    async fn test_rejected_key_is_not_retried() {
        let source = ScriptedSource::new(vec![
            Err(MarketError::ApiError { status: 401, body: "unknown API Key".to_string() }),
            Ok(vec![article(2023, 1, 9, &["positive"])]),
        ]);
        let clock = Arc::new(ManualClock::new());
        let aggregator = SentimentAggregator::new(source.clone(), &config(), clock.clone());

        let report = aggregator.run("CRWD", d(2023, 1, 1), d(2023, 1, 15)).await.unwrap();

        assert_eq!(report.failed_windows, vec![DateWindow { start: d(2023, 1, 1), end: d(2023, 1, 8) }]);
        assert_eq!(source.queries().len(), 2);
        assert_eq!(source.queries()[1].published_from, d(2023, 1, 8));
        // Only the 12s window pacing, no 60s error delay
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(12)]);
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{
    Clock, MarketError, NewsArticle, NewsInsight, NewsQuery, NewsSource, RateLimiter, RetryPolicy,
    TokioClock,
};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://api.polygon.io";

/// Largest page the news endpoint will serve
const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Clone)]
pub struct PolygonClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
}

impl PolygonClient {
    pub fn new(api_key: String) -> Self {
        // Free tier allows 5 req/min. Paid plans should raise POLYGON_RATE_LIMIT.
        let rate_limit: usize = std::env::var("POLYGON_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self::with_clock(api_key, rate_limit, Arc::new(TokioClock))
    }

    pub fn with_clock(api_key: String, requests_per_minute: usize, clock: Arc<dyn Clock>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client,
            rate_limiter: RateLimiter::per_minute(requests_per_minute, clock),
            retry: RetryPolicy::exponential(3, Duration::from_secs(15), Duration::from_secs(60)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a request with rate limiting and bounded retry on 429 / 5xx.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, MarketError> {
        let request = builder.build().map_err(|e| MarketError::RequestFailed(e.to_string()))?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.rate_limiter.acquire().await;
            let req_clone = request.try_clone()
                .ok_or_else(|| MarketError::RequestFailed("Cannot clone request".to_string()))?;
            let response = self.client.execute(req_clone).await
                .map_err(|e| MarketError::RequestFailed(e.to_string()))?;

            let status = response.status();
            if status.as_u16() != 429 && !status.is_server_error() {
                return Ok(response);
            }

            if !self.retry.should_retry(attempt) {
                if status.as_u16() == 429 {
                    return Err(MarketError::RateLimited(attempt));
                }
                return Err(MarketError::ApiError {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }

            let wait = self.retry.delay_after(attempt);
            tracing::warn!(
                "Polygon HTTP {}, waiting {}s before retry {}/{}",
                status.as_u16(),
                wait.as_secs(),
                attempt,
                self.retry.max_attempts - 1
            );
            self.rate_limiter.clock().sleep(wait).await;
        }
    }

    async fn get_news_page(&self, builder: reqwest::RequestBuilder) -> Result<NewsResponse, MarketError> {
        let response = self.send_request(builder).await?;

        if !response.status().is_success() {
            return Err(MarketError::ApiError {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| MarketError::InvalidResponse(e.to_string()))
    }

    /// List news for a ticker, following `next_url` until `query.limit` articles
    /// are collected or the feed is exhausted.
    pub async fn list_ticker_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, MarketError> {
        let url = format!("{}/v2/reference/news", self.base_url);
        let cap = query.limit as usize;

        let mut builder = self.client.get(&url).query(&news_query_params(query, &self.api_key));
        let mut articles = Vec::new();

        loop {
            let page = self.get_news_page(builder).await?;
            articles.extend(page.results.into_iter().filter_map(into_article));

            if articles.len() >= cap {
                articles.truncate(cap);
                break;
            }

            match page.next_url {
                Some(next) => {
                    tracing::debug!("Following Polygon news cursor ({} articles so far)", articles.len());
                    builder = self.client.get(&next).query(&[("apiKey", self.api_key.as_str())]);
                }
                None => break,
            }
        }

        tracing::debug!(
            "Fetched {} {} news articles for {}..{}",
            articles.len(),
            query.ticker,
            query.published_from,
            query.published_to
        );
        Ok(articles)
    }
}

#[async_trait]
impl NewsSource for PolygonClient {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, MarketError> {
        self.list_ticker_news(query).await
    }
}

fn news_query_params(query: &NewsQuery, api_key: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("ticker", query.ticker.clone()),
        ("published_utc.gte", query.published_from.format("%Y-%m-%d").to_string()),
        ("published_utc.lt", query.published_to.format("%Y-%m-%d").to_string()),
        ("order", query.order.as_str().to_string()),
        ("sort", "published_utc".to_string()),
        ("limit", query.limit.clamp(1, MAX_PAGE_SIZE).to_string()),
    ];
    if query.include_insights {
        params.push(("include_insights", "true".to_string()));
    }
    params.push(("apiKey", api_key.to_string()));
    params
}

fn into_article(r: NewsResult) -> Option<NewsArticle> {
    let published_utc = match DateTime::parse_from_rfc3339(&r.published_utc) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!("Skipping article {} with bad timestamp '{}': {}", r.id, r.published_utc, e);
            return None;
        }
    };

    Some(NewsArticle {
        id: r.id,
        title: r.title,
        author: r.author,
        published_utc,
        article_url: r.article_url,
        description: r.description,
        tickers: r.tickers,
        insights: r.insights.unwrap_or_default(),
    })
}

// Response structures

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsResult>,
    next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    id: String,
    title: String,
    author: Option<String>,
    published_utc: String,
    #[serde(default)]
    article_url: String,
    description: Option<String>,
    #[serde(default)]
    tickers: Vec<String>,
    insights: Option<Vec<NewsInsight>>,
}

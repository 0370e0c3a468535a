use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentiment label, either taken from a provider insight or derived from a model reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn name(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }

    /// Parse the first word of a free-text model reply.
    ///
    /// Surrounding punctuation is ignored and matching is case-insensitive.
    /// Returns `None` for anything outside the three labels, including an
    /// empty reply.
    pub fn from_model_reply(reply: &str) -> Option<Self> {
        let token = reply.split_whitespace().next()?;
        token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .parse()
            .ok()
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label '{}'", other)),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-ticker sentiment tag attached to a news article by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsInsight {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub sentiment_reasoning: Option<String>,
}

impl NewsInsight {
    pub fn label(&self) -> Option<SentimentLabel> {
        self.sentiment.parse().ok()
    }
}

/// News article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub published_utc: DateTime<Utc>,
    pub article_url: String,
    pub description: Option<String>,
    pub tickers: Vec<String>,
    #[serde(default)]
    pub insights: Vec<NewsInsight>,
}

impl NewsArticle {
    /// Calendar day of publication in UTC
    pub fn published_on(&self) -> NaiveDate {
        self.published_utc.date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Ticker-scoped news search over `[published_from, published_to)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsQuery {
    pub ticker: String,
    pub published_from: NaiveDate,
    pub published_to: NaiveDate,
    /// Upper bound on the total number of articles returned
    pub limit: u32,
    pub order: SortOrder,
    pub include_insights: bool,
}

impl NewsQuery {
    pub fn new(ticker: impl Into<String>, published_from: NaiveDate, published_to: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            published_from,
            published_to,
            limit: 1000,
            order: SortOrder::Asc,
            include_insights: true,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

use async_trait::async_trait;
use crate::{MarketError, NewsArticle, NewsQuery};
use std::sync::Arc;

/// Source of ticker-scoped news articles
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, MarketError>;
}

/// Free-text completion backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, MarketError>;
}

#[async_trait]
impl<T: NewsSource + ?Sized> NewsSource for Arc<T> {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, MarketError> {
        (**self).fetch_news(query).await
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, MarketError> {
        (**self).generate(prompt).await
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Rate limited after {0} attempts")]
    RateLimited(u32),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarketError {
    /// Whether another attempt at the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MarketError::RequestFailed(_) | MarketError::RateLimited(_) => true,
            MarketError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

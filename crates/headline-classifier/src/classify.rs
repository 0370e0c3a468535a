use chrono::{DateTime, SecondsFormat, Utc};
use market_core::{NewsArticle, SentimentLabel, TextGenerator};

/// Prompt asking for a single-word verdict on one headline
pub fn build_prompt(ticker: &str, title: &str, published_utc: &DateTime<Utc>) -> String {
    format!(
        "Analyze this news headline regarding {ticker}. Respond with ONLY one word: \
         Positive, Negative, or Neutral. Use Neutral if uncertain. No explanations or punctuation.\n\
         \n\
         Headline: {title}\n\
         Date: {date}\n\
         Company: {ticker}",
        ticker = ticker,
        title = title,
        date = published_utc.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Outcome of classifying one headline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub label: SentimentLabel,
    /// True when the model failed or replied with something other than a label
    pub fell_back: bool,
}

impl Verdict {
    fn fallback() -> Self {
        Self { label: SentimentLabel::Neutral, fell_back: true }
    }
}

/// Ask the model for a label, falling back to Neutral on any failure.
pub async fn classify_headline<G: TextGenerator + ?Sized>(
    generator: &G,
    ticker: &str,
    article: &NewsArticle,
) -> Verdict {
    let prompt = build_prompt(ticker, &article.title, &article.published_utc);

    match generator.generate(&prompt).await {
        Ok(reply) => match SentimentLabel::from_model_reply(&reply) {
            Some(label) => Verdict { label, fell_back: false },
            None => {
                tracing::warn!("Unrecognised model reply {:?} for '{}', using Neutral", reply.trim(), article.title);
                Verdict::fallback()
            }
        },
        Err(e) => {
            tracing::warn!("AI analysis error for '{}': {}", article.title, e);
            Verdict::fallback()
        }
    }
}

use chrono::NaiveDate;
use market_core::{NewsArticle, SentimentLabel};
use serde::{Deserialize, Serialize};

use crate::windows::DateWindow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentCounts {
    pub fn new(positive: u32, negative: u32, neutral: u32) -> Self {
        Self { positive, negative, neutral }
    }

    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }
}

/// Insight counts for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub counts: SentimentCounts,
}

impl DailySentiment {
    pub fn empty(date: NaiveDate) -> Self {
        Self { date, counts: SentimentCounts::default() }
    }
}

/// Zero-filled days for a window whose news could not be fetched
pub fn empty_window(window: &DateWindow) -> Vec<DailySentiment> {
    window.days().map(DailySentiment::empty).collect()
}

/// Count insight labels per publication day across the window.
///
/// Every day of the window gets an entry. An article counts once per insight
/// with a recognised label; articles outside the window are ignored.
pub fn tally_window(window: &DateWindow, articles: &[NewsArticle]) -> Vec<DailySentiment> {
    let mut days = empty_window(window);

    for article in articles {
        let published = article.published_on();
        let Some(day) = days.iter_mut().find(|d| d.date == published) else {
            continue;
        };
        for label in article.insights.iter().filter_map(|i| i.label()) {
            day.counts.record(label);
        }
    }

    days
}

//! headline-classifier: label recent news headlines for a ticker as
//! Positive, Negative or Neutral with a generative-language model.

pub mod classify;
pub mod config;
pub mod pipeline;

pub use classify::{build_prompt, classify_headline, Verdict};
pub use config::ClassifierConfig;
pub use pipeline::{ClassifiedHeadline, HeadlineClassifier};

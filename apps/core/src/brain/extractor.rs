//! Info Extraction using regex patterns and closed vocabularies.
//!
//! Pulls email addresses, phone numbers, topic keywords and sentiment cues
//! out of raw text. Pure and infallible: no match means an empty result.

use regex::Regex;
use std::sync::LazyLock;

use super::keywords::{contains_any, matched_topics, NEGATIVE_CUES, POSITIVE_CUES};
use crate::models::{ExtractedInfo, SentimentIndicators};

// NOTE: expect() is acceptable on compile-time constant patterns
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+")
        .expect("Invalid regex: email pattern")
});

// Optional country code, optional (area) code, then a 3-4 + 4 digit local number.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[- ]?)?(?:\(?\d{2,4}\)?[- ]?)?\d{3,4}[- ]?\d{4}")
        .expect("Invalid regex: phone pattern")
});

/// Extracts structured signals from free text.
#[derive(Debug, Default, Clone, Copy)]
pub struct InfoExtractor;

impl InfoExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every signal from `text`.
    pub fn extract(&self, text: &str) -> ExtractedInfo {
        let lower = text.to_lowercase();

        ExtractedInfo {
            emails_found: EMAIL_PATTERN
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect(),
            phones_found: PHONE_PATTERN
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect(),
            mentioned_topics: matched_topics(&lower).collect(),
            sentiment_indicators: SentimentIndicators {
                negative: contains_any(&lower, NEGATIVE_CUES),
                positive: contains_any(&lower, POSITIVE_CUES),
            },
        }
    }
}

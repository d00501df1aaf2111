//! Triage Analyzer - orchestrator for the fast analysis stage.
//!
//! Runs sentiment classification and info extraction on an email, then feeds
//! the sentiment into the priority scorer.

use serde::Serialize;
use std::time::Instant;
use tracing::debug;

use super::extractor::InfoExtractor;
use super::priority::compute_priority;
use super::sentiment::SentimentClassifier;
use crate::models::{ExtractedInfo, PriorityAssessment, Sentiment};

/// Everything the analysis stage learned about one email.
#[derive(Debug, Clone, Serialize)]
pub struct TriageSignals {
    pub sentiment: Sentiment,
    pub priority: PriorityAssessment,
    pub extracted: ExtractedInfo,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl TriageSignals {
    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Sentiment: {}, Priority: {} ({:.1}), Topics: {}, Emails: {}, Phones: {}",
            self.sentiment,
            self.priority.label,
            self.priority.score,
            self.extracted.mentioned_topics.len(),
            self.extracted.emails_found.len(),
            self.extracted.phones_found.len(),
        )
    }
}

/// Main analyzer that orchestrates the non-generative components.
#[derive(Clone)]
pub struct TriageAnalyzer {
    sentiment: SentimentClassifier,
    extractor: InfoExtractor,
}

impl TriageAnalyzer {
    pub fn new(sentiment: SentimentClassifier) -> Self {
        Self {
            sentiment,
            extractor: InfoExtractor::new(),
        }
    }

    /// Analyze one email.
    pub async fn analyze(&self, subject: &str, body: &str) -> TriageSignals {
        let start = Instant::now();
        let text = format!("{}\n{}", subject, body);

        // 1. Sentiment and extraction are independent of each other
        let sentiment = self.sentiment.classify(&text).await;
        let extracted = self.extractor.extract(&text);

        // 2. Priority needs the sentiment
        let priority = compute_priority(subject, body, sentiment);

        let signals = TriageSignals {
            sentiment,
            priority,
            extracted,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };
        debug!("Triage signals: {}", signals.summary());
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::sentiment::LexiconSentimentModel;
    use crate::models::{PriorityLabel, Topic};
    use std::sync::Arc;

    fn analyzer() -> TriageAnalyzer {
        TriageAnalyzer::new(SentimentClassifier::new(Arc::new(LexiconSentimentModel)))
    }

    #[tokio::test]
    async fn test_billing_complaint() {
        let signals = analyzer()
            .analyze(
                "Need help, billing discrepancy",
                "I was billed twice for my subscription this month.",
            )
            .await;

        assert_eq!(signals.sentiment, Sentiment::Negative);
        assert_eq!(signals.priority.label, PriorityLabel::Urgent);
        assert_eq!(signals.priority.score, 3.0);
        assert!(signals.extracted.mentions(Topic::Billing));
        assert!(signals.extracted.sentiment_indicators.negative);
    }

    #[tokio::test]
    async fn test_thank_you_note() {
        let signals = analyzer()
            .analyze("Support follow-up", "Thank you, the dashboard looks great")
            .await;

        assert_eq!(signals.sentiment, Sentiment::Positive);
        assert_eq!(signals.priority.score, 0.0);
        assert_eq!(signals.priority.label, PriorityLabel::NotUrgent);
        assert!(signals.summary().contains("Sentiment: Positive"));
    }
}

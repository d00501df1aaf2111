//! Priority Scoring.
//!
//! Converts urgency keywords and sentiment into a non-negative score and an
//! Urgent / Not urgent label. Deterministic and side-effect free.

use super::keywords::{matched_keywords, URGENT_KEYWORDS};
use crate::models::{PriorityAssessment, PriorityLabel, Sentiment};

/// Score added for each distinct urgency keyword present.
pub const KEYWORD_WEIGHT: f64 = 2.0;
/// Score added when the message reads as negative.
pub const NEGATIVE_BOOST: f64 = 1.0;
/// Score removed when the message reads as positive.
pub const POSITIVE_PENALTY: f64 = 0.5;
/// Scores at or above this threshold are urgent.
pub const URGENT_THRESHOLD: f64 = 2.0;

/// Score a message from its subject, body and sentiment.
pub fn compute_priority(subject: &str, body: &str, sentiment: Sentiment) -> PriorityAssessment {
    let text = format!("{} {}", subject, body).to_lowercase();

    let mut score = matched_keywords(&text, URGENT_KEYWORDS).len() as f64 * KEYWORD_WEIGHT;

    match sentiment {
        Sentiment::Negative => score += NEGATIVE_BOOST,
        Sentiment::Positive => score -= POSITIVE_PENALTY,
        Sentiment::Neutral => {}
    }

    let score = score.max(0.0);
    let label = if score >= URGENT_THRESHOLD {
        PriorityLabel::Urgent
    } else {
        PriorityLabel::NotUrgent
    };

    PriorityAssessment { label, score }
}

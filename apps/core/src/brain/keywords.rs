//! Closed keyword vocabularies used by the fast, non-LLM analysis.
//!
//! All lists are lowercase and matched by substring containment against
//! lowercased text, so a keyword also matches inside longer words.

use crate::models::Topic;

/// Keywords that each add to the urgency score when present.
///
/// Overlapping entries (e.g. "error" inside a longer phrase) contribute
/// independently; callers must not deduplicate them.
pub const URGENT_KEYWORDS: &[&str] = &[
    "immediately",
    "urgent",
    "asap",
    "cannot access",
    "down",
    "critical",
    "refund",
    "403",
    "error",
    "latency",
    "discrepancy",
];

/// Cues for a negatively toned message.
pub const NEGATIVE_CUES: &[&str] = &[
    "cannot",
    "can't",
    "error",
    "critical",
    "discrepancy",
    "billed twice",
    "latency",
    "forbidden",
];

/// Cues for a positively toned message.
pub const POSITIVE_CUES: &[&str] = &["thank you", "appreciate", "great", "awesome"];

/// Subject terms that make an inbound email eligible for support triage.
pub const SUPPORT_FILTER_TERMS: &[&str] = &["support", "query", "request", "help"];

/// Returns every keyword of `vocabulary` contained in `text_lower`, in vocabulary order.
pub fn matched_keywords<'a>(text_lower: &str, vocabulary: &[&'a str]) -> Vec<&'a str> {
    vocabulary
        .iter()
        .copied()
        .filter(|keyword| text_lower.contains(keyword))
        .collect()
}

/// Returns true if any keyword of `vocabulary` is contained in `text_lower`.
pub fn contains_any(text_lower: &str, vocabulary: &[&str]) -> bool {
    vocabulary.iter().any(|keyword| text_lower.contains(keyword))
}

/// Returns the topics whose keyword is contained in `text_lower`.
pub fn matched_topics(text_lower: &str) -> impl Iterator<Item = Topic> + '_ {
    Topic::ALL
        .into_iter()
        .filter(move |topic| text_lower.contains(topic.keyword()))
}

//! Brain Module Tests
//!
//! Properties of the fast analysis stage over a small, realistic inbox.

use crate::brain::keywords::URGENT_KEYWORDS;
use crate::brain::sentiment::{label_from_prediction, BinaryLabel, SentimentPrediction};
use crate::brain::{compute_priority, InfoExtractor};
use crate::models::{PriorityLabel, Sentiment, Topic};

const INBOX: &[(&str, &str)] = &[
    ("URGENT: system down", ""),
    ("Thanks!", "Great service"),
    ("Need help, billing discrepancy", "I was billed twice this month."),
    ("API request", "We get a 403 error on every call, forbidden everywhere."),
    ("Query about orders", "Could you tell me where my orders are?"),
    ("Support", "Dashboard latency is terrible in EU, we cannot work."),
    ("", ""),
    ("Refund ASAP", "Please refund immediately, this is critical."),
];

const SENTIMENTS: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

#[cfg(test)]
mod priority_property_tests {
    use super::*;

    #[test]
    fn test_score_never_negative() {
        for (subject, body) in INBOX {
            for sentiment in SENTIMENTS {
                let result = compute_priority(subject, body, sentiment);
                assert!(
                    result.score >= 0.0,
                    "Negative score for '{}' / {:?}",
                    subject,
                    sentiment
                );
            }
        }
    }

    #[test]
    fn test_label_iff_threshold() {
        for (subject, body) in INBOX {
            for sentiment in SENTIMENTS {
                let result = compute_priority(subject, body, sentiment);
                assert_eq!(
                    result.label == PriorityLabel::Urgent,
                    result.score >= 2.0,
                    "Label/score mismatch for '{}': {:?}",
                    subject,
                    result
                );
            }
        }
    }

    #[test]
    fn test_sentiment_ordering() {
        // Same text: Negative >= Neutral >= Positive.
        for (subject, body) in INBOX {
            let neg = compute_priority(subject, body, Sentiment::Negative).score;
            let neu = compute_priority(subject, body, Sentiment::Neutral).score;
            let pos = compute_priority(subject, body, Sentiment::Positive).score;
            assert!(neg >= neu && neu >= pos, "Ordering broken for '{}'", subject);
        }
    }

    #[test]
    fn test_score_is_multiple_of_keyword_weight_when_neutral() {
        for (subject, body) in INBOX {
            let text = format!("{} {}", subject, body).to_lowercase();
            let expected =
                2.0 * URGENT_KEYWORDS.iter().filter(|k| text.contains(*k)).count() as f64;
            assert_eq!(compute_priority(subject, body, Sentiment::Neutral).score, expected);
        }
    }

    #[test]
    fn test_known_scores() {
        let system_down = compute_priority("URGENT: system down", "", Sentiment::Negative);
        assert_eq!(system_down.score, 5.0);
        assert_eq!(system_down.label, PriorityLabel::Urgent);

        let thanks = compute_priority("Thanks!", "Great service", Sentiment::Positive);
        assert_eq!(thanks.score, 0.0);
        assert_eq!(thanks.label, PriorityLabel::NotUrgent);
    }
}

#[cfg(test)]
mod extraction_property_tests {
    use super::*;

    #[test]
    fn test_topics_come_from_closed_vocabulary() {
        let extractor = InfoExtractor::new();
        for (subject, body) in INBOX {
            let info = extractor.extract(&format!("{}\n{}", subject, body));
            for topic in &info.mentioned_topics {
                assert!(Topic::ALL.contains(topic));
            }
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = InfoExtractor::new();
        for (subject, body) in INBOX {
            let text = format!("{}\n{}", subject, body);
            assert_eq!(extractor.extract(&text), extractor.extract(&text));
        }
    }

    #[test]
    fn test_urgent_subjects_in_inbox() {
        let urgent: Vec<&str> = INBOX
            .iter()
            .filter(|(subject, body)| compute_priority(subject, body, Sentiment::Neutral).label.is_urgent())
            .map(|(subject, _)| *subject)
            .collect();

        assert_eq!(
            urgent,
            vec![
                "URGENT: system down",
                "Need help, billing discrepancy",
                "API request",
                "Support",
                "Refund ASAP",
            ]
        );
    }
}

#[cfg(test)]
mod sentiment_mapping_tests {
    use super::*;

    #[test]
    fn test_low_confidence_is_always_neutral() {
        for label in [BinaryLabel::Positive, BinaryLabel::Negative] {
            for score in [0.0, 0.3, 0.5, 0.69] {
                let prediction = SentimentPrediction { label, score };
                assert_eq!(label_from_prediction(prediction, 0.7), Sentiment::Neutral);
            }
        }
    }

    #[test]
    fn test_confident_predictions_keep_label() {
        let positive = SentimentPrediction {
            label: BinaryLabel::Positive,
            score: 0.7,
        };
        let negative = SentimentPrediction {
            label: BinaryLabel::Negative,
            score: 0.99,
        };
        assert_eq!(label_from_prediction(positive, 0.7), Sentiment::Positive);
        assert_eq!(label_from_prediction(negative, 0.7), Sentiment::Negative);
    }
}

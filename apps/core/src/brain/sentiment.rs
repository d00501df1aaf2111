//! Sentiment Classification.
//!
//! Wraps a binary (positive/negative) sentiment model and maps its output onto
//! Positive / Negative / Neutral. Low-confidence predictions become Neutral and
//! every model failure fails closed to Neutral.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::keywords::{matched_keywords, NEGATIVE_CUES, POSITIVE_CUES};
use crate::config::{SentimentBackend, SentimentConfig};
use crate::error::AppError;
use crate::models::Sentiment;

/// Predictions below this confidence are reported as Neutral.
pub const CONFIDENCE_THRESHOLD: f32 = 0.7;
/// Only this many leading characters are sent to the model.
pub const MAX_INPUT_CHARS: usize = 4000;
const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(15);

/// Raw label of a binary sentiment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryLabel {
    Positive,
    Negative,
}

/// A (label, confidence) pair produced by a sentiment model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPrediction {
    pub label: BinaryLabel,
    /// Model confidence in `label`, between 0.0 and 1.0.
    pub score: f32,
}

/// A binary sentiment model.
#[async_trait]
pub trait SentimentModel: Send + Sync + 'static {
    async fn predict(&self, text: &str) -> Result<SentimentPrediction, AppError>;
}

/// Map a model prediction onto the three-way label.
pub fn label_from_prediction(prediction: SentimentPrediction, threshold: f32) -> Sentiment {
    if prediction.score < threshold {
        return Sentiment::Neutral;
    }
    match prediction.label {
        BinaryLabel::Positive => Sentiment::Positive,
        BinaryLabel::Negative => Sentiment::Negative,
    }
}

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Three-way sentiment classifier over an injected binary model.
#[derive(Clone)]
pub struct SentimentClassifier {
    model: Option<Arc<dyn SentimentModel>>,
    threshold: f32,
    max_chars: usize,
    timeout: Duration,
}

impl SentimentClassifier {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self {
            model: Some(model),
            threshold: CONFIDENCE_THRESHOLD,
            max_chars: MAX_INPUT_CHARS,
            timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    /// A classifier whose model could not be loaded. Always answers Neutral.
    pub fn unavailable() -> Self {
        Self {
            model: None,
            threshold: CONFIDENCE_THRESHOLD,
            max_chars: MAX_INPUT_CHARS,
            timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    /// Builds the classifier for the configured backend.
    pub fn from_config(config: &SentimentConfig) -> Self {
        let model: Arc<dyn SentimentModel> = match &config.backend {
            SentimentBackend::Lexicon => Arc::new(LexiconSentimentModel),
            SentimentBackend::Http {
                api_base,
                model,
                api_token,
            } => match HttpSentimentModel::new(
                api_base.clone(),
                model.clone(),
                api_token.clone(),
                config.timeout(),
            ) {
                Ok(http) => Arc::new(http),
                Err(e) => {
                    warn!("Sentiment model unavailable, defaulting to Neutral: {}", e);
                    return Self::unavailable();
                }
            },
        };
        Self::new(model).with_timeout(config.timeout() + Duration::from_secs(1))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Classify `text`. Never fails.
    pub async fn classify(&self, text: &str) -> Sentiment {
        let Some(model) = &self.model else {
            return Sentiment::Neutral;
        };
        let input = truncate_chars(text, self.max_chars);

        match timeout(self.timeout, model.predict(input)).await {
            Ok(Ok(prediction)) => {
                debug!(
                    "Sentiment prediction {:?} ({:.2})",
                    prediction.label, prediction.score
                );
                label_from_prediction(prediction, self.threshold)
            }
            Ok(Err(e)) => {
                warn!("Sentiment model failed, defaulting to Neutral: {}", e);
                Sentiment::Neutral
            }
            Err(e) => {
                warn!("Sentiment model timed out, defaulting to Neutral: {}", e);
                Sentiment::Neutral
            }
        }
    }
}

/// Local cue-counting model. Deterministic and offline.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconSentimentModel;

#[async_trait]
impl SentimentModel for LexiconSentimentModel {
    async fn predict(&self, text: &str) -> Result<SentimentPrediction, AppError> {
        let lower = text.to_lowercase();
        let negative = matched_keywords(&lower, NEGATIVE_CUES).len();
        let positive = matched_keywords(&lower, POSITIVE_CUES).len();
        let total = negative + positive;

        if total == 0 {
            return Ok(SentimentPrediction {
                label: BinaryLabel::Positive,
                score: 0.5,
            });
        }

        let label = if positive > negative {
            BinaryLabel::Positive
        } else {
            BinaryLabel::Negative
        };
        let margin = negative.abs_diff(positive) as f32 / total as f32;

        Ok(SentimentPrediction {
            label,
            score: 0.5 + 0.5 * margin,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Remote text-classification model behind a Hugging Face style inference API.
pub struct HttpSentimentModel {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpSentimentModel {
    pub fn new(
        api_base: String,
        model: String,
        api_token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/models/{}", api_base.trim_end_matches('/'), model),
            api_token,
        })
    }
}

#[async_trait]
impl SentimentModel for HttpSentimentModel {
    async fn predict(&self, text: &str) -> Result<SentimentPrediction, AppError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Sentiment request failed with status {}: {}",
                status, body
            )));
        }

        let candidates = match res.json::<InferenceResponse>().await? {
            InferenceResponse::Nested(rows) => rows.into_iter().flatten().collect(),
            InferenceResponse::Flat(row) => row,
        };

        let best = candidates
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| AppError::Internal("Sentiment response was empty".to_string()))?;

        let label = if best.label.to_uppercase().starts_with("POS") {
            BinaryLabel::Positive
        } else {
            BinaryLabel::Negative
        };

        Ok(SentimentPrediction {
            label,
            score: best.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedModel(SentimentPrediction);

    #[async_trait]
    impl SentimentModel for FixedModel {
        async fn predict(&self, _text: &str) -> Result<SentimentPrediction, AppError> {
            Ok(self.0)
        }
    }

    struct FailingModel;

    #[async_trait]
    impl SentimentModel for FailingModel {
        async fn predict(&self, _text: &str) -> Result<SentimentPrediction, AppError> {
            Err(AppError::Internal("inference exploded".to_string()))
        }
    }

    struct SlowModel;

    #[async_trait]
    impl SentimentModel for SlowModel {
        async fn predict(&self, _text: &str) -> Result<SentimentPrediction, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(SentimentPrediction {
                label: BinaryLabel::Negative,
                score: 0.99,
            })
        }
    }

    fn classifier(label: BinaryLabel, score: f32) -> SentimentClassifier {
        SentimentClassifier::new(Arc::new(FixedModel(SentimentPrediction { label, score })))
    }

    #[tokio::test]
    async fn test_low_confidence_is_neutral() {
        for label in [BinaryLabel::Positive, BinaryLabel::Negative] {
            for score in [0.0, 0.5, 0.69] {
                assert_eq!(classifier(label, score).classify("x").await, Sentiment::Neutral);
            }
        }
    }

    #[tokio::test]
    async fn test_confident_labels_pass_through() {
        assert_eq!(
            classifier(BinaryLabel::Positive, 0.7).classify("x").await,
            Sentiment::Positive
        );
        assert_eq!(
            classifier(BinaryLabel::Negative, 0.98).classify("x").await,
            Sentiment::Negative
        );
    }

    #[tokio::test]
    async fn test_failures_are_neutral() {
        let failing = SentimentClassifier::new(Arc::new(FailingModel));
        assert_eq!(failing.classify("terrible").await, Sentiment::Neutral);

        assert_eq!(
            SentimentClassifier::unavailable().classify("terrible").await,
            Sentiment::Neutral
        );

        let slow = SentimentClassifier::new(Arc::new(SlowModel))
            .with_timeout(Duration::from_millis(50));
        assert_eq!(slow.classify("terrible").await, Sentiment::Neutral);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_lexicon_model() {
        let model = LexiconSentimentModel;

        let neg = model.predict("I was billed twice, a discrepancy").await.unwrap();
        assert_eq!(neg.label, BinaryLabel::Negative);
        assert_eq!(neg.score, 1.0);

        let pos = model.predict("Thank you, awesome work").await.unwrap();
        assert_eq!(pos.label, BinaryLabel::Positive);
        assert_eq!(pos.score, 1.0);

        let none = model.predict("Where is my parcel").await.unwrap();
        assert_eq!(none.score, 0.5);

        let mixed = model.predict("great, but an error").await.unwrap();
        assert_eq!(mixed.label, BinaryLabel::Negative);
        assert_eq!(mixed.score, 0.5);
    }

    #[tokio::test]
    async fn test_http_model_nested_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/sst2"))
            .and(header("authorization", "Bearer hf-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
                { "label": "NEGATIVE", "score": 0.93 },
                { "label": "POSITIVE", "score": 0.07 }
            ]])))
            .mount(&mock_server)
            .await;

        let model = HttpSentimentModel::new(
            mock_server.uri(),
            "sst2".to_string(),
            Some("hf-token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        let prediction = model.predict("nothing works").await.unwrap();
        assert_eq!(prediction.label, BinaryLabel::Negative);
        assert!((prediction.score - 0.93).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_http_model_flat_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/sst2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "label": "POSITIVE", "score": 0.81 }
            ])))
            .mount(&mock_server)
            .await;

        let model =
            HttpSentimentModel::new(mock_server.uri(), "sst2".to_string(), None, Duration::from_secs(5))
                .unwrap();

        let sentiment = SentimentClassifier::new(Arc::new(model)).classify("love it").await;
        assert_eq!(sentiment, Sentiment::Positive);
    }

    #[tokio::test]
    async fn test_http_model_server_error_is_neutral() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Model is loading"))
            .mount(&mock_server)
            .await;

        let model =
            HttpSentimentModel::new(mock_server.uri(), "sst2".to_string(), None, Duration::from_secs(5))
                .unwrap();
        let err = model.predict("hello").await.unwrap_err();
        assert!(err.to_string().contains("503"));

        let sentiment = SentimentClassifier::new(Arc::new(model)).classify("hello").await;
        assert_eq!(sentiment, Sentiment::Neutral);
    }
}

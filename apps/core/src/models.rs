use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Three-way sentiment label attached to every triaged email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ordinal urgency label derived from the priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum PriorityLabel {
    Urgent,
    #[serde(rename = "Not urgent")]
    #[sqlx(rename = "Not urgent")]
    NotUrgent,
}

impl PriorityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLabel::Urgent => "Urgent",
            PriorityLabel::NotUrgent => "Not urgent",
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, PriorityLabel::Urgent)
    }
}

impl fmt::Display for PriorityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Review status of a triaged email. `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EmailStatus {
    Pending,
    Resolved,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Pending => "pending",
            EmailStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where the stored draft reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DraftSource {
    /// Produced by the generative model.
    Generated,
    /// Produced by the deterministic fallback template.
    Templated,
}

impl DraftSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftSource::Generated => "generated",
            DraftSource::Templated => "templated",
        }
    }
}

impl fmt::Display for DraftSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Product/topic vocabulary recognised in email text.
///
/// The set is closed: extracted topics can only ever be one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Dashboard,
    Api,
    Crm,
    Billing,
    Latency,
    Orders,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Dashboard,
        Topic::Api,
        Topic::Crm,
        Topic::Billing,
        Topic::Latency,
        Topic::Orders,
    ];

    /// The lowercase keyword matched against email text.
    pub fn keyword(&self) -> &'static str {
        match self {
            Topic::Dashboard => "dashboard",
            Topic::Api => "api",
            Topic::Crm => "crm",
            Topic::Billing => "billing",
            Topic::Latency => "latency",
            Topic::Orders => "orders",
        }
    }
}

/// Presence of negative- and positive-toned lexical cues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentIndicators {
    pub negative: bool,
    pub positive: bool,
}

/// Structured signals pulled out of raw email text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    /// Syntactically valid email addresses found in the text.
    pub emails_found: BTreeSet<String>,
    /// Phone-number-like substrings found in the text.
    pub phones_found: BTreeSet<String>,
    /// Topics from the closed vocabulary mentioned in the text.
    pub mentioned_topics: BTreeSet<Topic>,
    pub sentiment_indicators: SentimentIndicators,
}

impl ExtractedInfo {
    pub fn mentions(&self, topic: Topic) -> bool {
        self.mentioned_topics.contains(&topic)
    }
}

/// Output of the priority scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityAssessment {
    pub label: PriorityLabel,
    /// Always `>= 0.0`.
    pub score: f64,
}

/// A fully triaged email ready to be inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmailRecord {
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// Unix timestamp (seconds) the email was sent.
    pub sent_at: i64,
    pub sentiment: Sentiment,
    pub priority: PriorityLabel,
    pub priority_score: f64,
    pub extracted_info: ExtractedInfo,
    pub ai_response: String,
    pub draft_source: DraftSource,
}

/// A persisted triaged email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailRecord {
    /// Store-assigned identifier.
    pub id: i64,
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// Unix timestamp (seconds) the email was sent.
    pub sent_at: i64,
    pub sentiment: Sentiment,
    pub priority: PriorityLabel,
    pub priority_score: f64,
    pub extracted_info: Json<ExtractedInfo>,
    /// Draft reply; editable by the operator after creation.
    pub ai_response: String,
    pub draft_source: DraftSource,
    /// Review status; editable by the operator after creation.
    pub status: EmailStatus,
    /// Unix timestamp (seconds) the record was created.
    pub ingested_at: i64,
}

impl EmailRecord {
    pub fn sent_date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sent_at, 0)
    }
}

/// Result of pushing one email through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedEmail {
    pub id: i64,
    pub record: NewEmailRecord,
}

/// Analytics snapshot over every stored email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailStats {
    pub total: i64,
    pub urgent: i64,
    pub pending: i64,
    pub resolved: i64,
    pub by_sentiment: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
}

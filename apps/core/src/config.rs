//! Runtime configuration.
//!
//! Values come from the process environment, after loading an optional `.env`
//! file from the working directory. Malformed values are rejected rather than
//! silently replaced by defaults.

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use crate::error::AppError;
use crate::fs_manager::PortablePathManager;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_SENTIMENT_API_BASE: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// Knowledge-base chunking and retrieval settings.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RetrievalConfig {
    /// Target chunk size in characters.
    #[validate(range(min = 50, max = 4000))]
    pub chunk_size: usize,
    /// Number of chunks retrieved per email.
    #[validate(range(min = 1, max = 50))]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 400,
            top_k: 4,
        }
    }
}

/// Settings for the generative model. Present only when a credential is configured.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct GenerationConfig {
    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub api_key: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(url)]
    pub api_base: String,
    /// Controls the creativity of the model's responses. Value between 0.0 and 2.0.
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            temperature: 0.3,
            timeout_secs: 30,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which sentiment model backs the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SentimentBackend {
    /// Local cue-counting model.
    Lexicon,
    /// Remote inference endpoint.
    Http {
        api_base: String,
        model: String,
        #[serde(skip_serializing)]
        api_token: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentConfig {
    pub backend: SentimentBackend,
    pub timeout_secs: u64,
}

impl SentimentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            backend: SentimentBackend::Lexicon,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    #[serde(skip)]
    pub paths: PortablePathManager,
    pub db_path: PathBuf,
    pub kb_dir: PathBuf,
    pub retrieval: RetrievalConfig,
    /// `None` disables AI drafting; every reply is then templated.
    pub generation: Option<GenerationConfig>,
    pub sentiment: SentimentConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads the environment.
    pub fn load() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Reads the configuration from the process environment only.
    pub fn from_env() -> Result<Self, AppError> {
        let paths = match non_empty("SUPPORTDESK_HOME") {
            Some(home) => PortablePathManager::new(home),
            None => PortablePathManager::from_current_dir()?,
        };

        let db_path = non_empty("SUPPORTDESK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.default_db_path());
        let kb_dir = non_empty("SUPPORTDESK_KB_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.kb_dir());

        let defaults = RetrievalConfig::default();
        let retrieval = RetrievalConfig {
            chunk_size: parse_or("SUPPORTDESK_CHUNK_SIZE", defaults.chunk_size)?,
            top_k: parse_or("SUPPORTDESK_RETRIEVAL_K", defaults.top_k)?,
        };
        retrieval.validate()?;

        let generation = match non_empty("OPENAI_API_KEY") {
            Some(api_key) => {
                let defaults = GenerationConfig::new(api_key);
                let generation = GenerationConfig {
                    model: non_empty("OPENAI_MODEL").unwrap_or(defaults.model.clone()),
                    api_base: non_empty("OPENAI_API_BASE").unwrap_or(defaults.api_base.clone()),
                    temperature: parse_or("OPENAI_TEMPERATURE", defaults.temperature)?,
                    timeout_secs: parse_or("OPENAI_TIMEOUT_SECS", defaults.timeout_secs)?,
                    ..defaults
                };
                generation.validate()?;
                Some(generation)
            }
            None => None,
        };

        let backend = match non_empty("SENTIMENT_BACKEND")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            None | Some("lexicon") => SentimentBackend::Lexicon,
            Some("http") => {
                let api_base = non_empty("SENTIMENT_API_BASE")
                    .unwrap_or_else(|| DEFAULT_SENTIMENT_API_BASE.to_string());
                url::Url::parse(&api_base)?;
                SentimentBackend::Http {
                    api_base,
                    model: non_empty("SENTIMENT_MODEL")
                        .unwrap_or_else(|| DEFAULT_SENTIMENT_MODEL.to_string()),
                    api_token: non_empty("SENTIMENT_API_TOKEN"),
                }
            }
            Some(other) => {
                return Err(AppError::Config(format!(
                    "SENTIMENT_BACKEND must be 'lexicon' or 'http', got '{}'",
                    other
                )))
            }
        };
        let sentiment = SentimentConfig {
            backend,
            timeout_secs: parse_or("SENTIMENT_TIMEOUT_SECS", SentimentConfig::default().timeout_secs)?,
        };

        let format = match non_empty("SUPPORTDESK_LOG_FORMAT")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "SUPPORTDESK_LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                    other
                )))
            }
        };
        let logging = LoggingConfig {
            level: non_empty("SUPPORTDESK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format,
        };

        Ok(Self {
            paths,
            db_path,
            kb_dir,
            retrieval,
            generation,
            sentiment,
            logging,
        })
    }

    pub fn generation_enabled(&self) -> bool {
        self.generation.is_some()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{} has an invalid value '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents errors originating from the email store, typically from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents errors raised while applying the embedded schema migrations.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents errors specific to the actor system, such as communication failures.
    #[error("Actor error: {0}")]
    Actor(#[from] crate::actors::messages::ActorError),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., malformed environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents failures of the embedding model.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A record addressed by identifier does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Validation(format!("CSV error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AppError::Timeout(format!("HTTP request timed out: {}", err));
        }
        AppError::Io(io::Error::other(format!("HTTP error: {}", err)))
    }
}

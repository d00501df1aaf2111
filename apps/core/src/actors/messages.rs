use crate::ingest::IncomingEmail;
use crate::models::ProcessedEmail;
use serde::Serialize;
use tokio::sync::oneshot;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// An error originating from the LLM actor.
    #[error("LLM request failed: {0}")]
    LlmError(String),
    /// An error originating from the RAG actor.
    #[error("RAG request failed: {0}")]
    RagError(String),
    /// A generic internal error within an actor.
    #[error("Internal system error: {0}")]
    Internal(String),
    /// An error indicating that an actor operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for ActorError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ActorError::Timeout(format!("Actor operation timed out: {}", err))
    }
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the `LlmActor`.
#[derive(Debug)]
pub enum LlmMessage {
    /// A request to generate a complete chat reply.
    Generate {
        prompt: String,
        system_prompt: Option<String>,
        temperature: Option<f32>,
        /// A channel to send the final `String` result back.
        responder: oneshot::Sender<Result<String, AppError>>,
    },
}

/// Messages that can be sent to the `RagActor`.
#[derive(Debug)]
pub enum RagMessage {
    /// A request to retrieve the `limit` most similar knowledge-base chunks.
    Retrieve {
        query: String,
        limit: usize,
        /// A channel to send the retrieval results back.
        responder: oneshot::Sender<Result<Vec<RetrievalResult>, AppError>>,
    },
}

/// A retrieved chunk and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub content: String,
    pub score: f32,
}

/// Messages that can be sent to the `SupervisorActor`.
#[derive(Debug)]
pub enum SupervisorMessage {
    /// Run one email through the full triage pipeline and persist it.
    ProcessEmail {
        email: IncomingEmail,
        responder: oneshot::Sender<Result<ProcessedEmail, AppError>>,
    },
    /// A command to shut down the supervisor.
    Shutdown,
}

use crate::actors::messages::{AppError, RetrievalResult};
use async_trait::async_trait;

/// Defines the public interface for an LLM (Large Language Model) actor.
///
/// This trait abstracts the specific implementation of the LLM, allowing a remote
/// chat-completions backend to be swapped for a fake in tests.
#[async_trait]
pub trait LlmActor: Send + Sync + 'static {
    /// Generates a complete text response based on a prompt and optional parameters.
    async fn generate_with_params(
        &self,
        prompt: String,
        system_prompt: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError>;
}

/// Defines the public interface for a RAG (Retrieval-Augmented Generation) actor.
///
/// Implementations answer similarity queries against an immutable knowledge base.
#[async_trait]
pub trait RagActor: Send + Sync + 'static {
    /// Returns up to `limit` chunks ordered by descending similarity.
    ///
    /// An absent knowledge base yields an empty list, not an error.
    async fn retrieve(&self, query: String, limit: usize) -> Result<Vec<RetrievalResult>, AppError>;
}

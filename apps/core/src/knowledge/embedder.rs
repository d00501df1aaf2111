use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use tracing::info;

use crate::error::AppError;

/// Text embedding model shared by indexing and retrieval.
pub trait Embedder: Send + Sync + 'static {
    /// Embeds each text, preserving input order.
    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError>;
}

/// Local ONNX embedder (AllMiniLM-L6-v2, 384 dimensions).
pub struct FastEmbedder {
    model: TextEmbedding,
}

impl FastEmbedder {
    pub const DIMENSION: usize = 384;

    /// Loads the model, downloading it into `cache_dir` on first use.
    pub fn new(cache_dir: PathBuf) -> Result<Self, AppError> {
        let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2);
        options.show_download_progress = false;
        options.cache_dir = cache_dir;

        let model = TextEmbedding::try_new(options)
            .map_err(|e| AppError::Embedding(format!("Failed to load embedding model: {}", e)))?;
        info!("Embedding model loaded successfully");
        Ok(Self { model })
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        self.model
            .embed(texts, None)
            .map_err(|e| AppError::Embedding(format!("Embedding failed: {}", e)))
    }
}

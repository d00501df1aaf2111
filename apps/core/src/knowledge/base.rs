use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::chunker::chunk_text;
use super::embedder::{Embedder, FastEmbedder};
use super::index::FlatIpIndex;
use crate::actors::messages::RetrievalResult;
use crate::error::AppError;
use crate::text_extract::{load_documents, SourceDocument};

/// A word-bounded slice of a knowledge-base document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeChunk {
    /// File name of the source document.
    pub source: String,
    /// Position of the chunk within its document.
    pub ordinal: usize,
    pub text: String,
}

/// Immutable chunk list plus its similarity index.
///
/// Chunk `i` is vector `i` in the index.
pub struct KnowledgeBase {
    chunks: Vec<KnowledgeChunk>,
    index: FlatIpIndex,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("chunks", &self.chunks.len())
            .field("dimension", &self.index.dimension())
            .finish()
    }
}

impl KnowledgeBase {
    /// Chunks and indexes every document in `dir`.
    ///
    /// Returns `Ok(None)` when the directory holds no usable document.
    pub fn build(
        dir: &Path,
        embedder: Arc<dyn Embedder>,
        chunk_size: usize,
    ) -> Result<Option<Self>, AppError> {
        let documents = load_documents(dir)?;
        Self::from_documents(documents, embedder, chunk_size)
    }

    pub fn from_documents(
        documents: Vec<SourceDocument>,
        embedder: Arc<dyn Embedder>,
        chunk_size: usize,
    ) -> Result<Option<Self>, AppError> {
        let chunks: Vec<KnowledgeChunk> = documents
            .iter()
            .flat_map(|doc| {
                chunk_text(&doc.content, chunk_size)
                    .into_iter()
                    .enumerate()
                    .map(|(ordinal, text)| KnowledgeChunk {
                        source: doc.name.clone(),
                        ordinal,
                        text,
                    })
            })
            .collect();

        if chunks.is_empty() {
            info!("No knowledge-base content found; retrieval disabled");
            return Ok(None);
        }

        let texts = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed(texts)?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or_default();
        let mut index = FlatIpIndex::new(dimension);
        for embedding in embeddings {
            index.add(embedding)?;
        }

        info!(
            "Indexed {} chunk(s) from {} document(s)",
            chunks.len(),
            documents.len()
        );
        Ok(Some(Self {
            chunks,
            index,
            embedder,
        }))
    }

    /// Builds the production knowledge base from `dir` with the local
    /// embedding model cached in `cache_dir`.
    ///
    /// Any failure (model load, unreadable directory, embedding) is logged and
    /// treated as "no knowledge base".
    pub fn load(dir: &Path, cache_dir: PathBuf, chunk_size: usize) -> Option<Self> {
        match crate::text_extract::list_documents(dir) {
            Ok(paths) if paths.is_empty() => {
                info!("No knowledge-base documents in {:?}", dir);
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Cannot read knowledge-base directory {:?}: {}", dir, e);
                return None;
            }
        }

        let embedder = match FastEmbedder::new(cache_dir) {
            Ok(embedder) => Arc::new(embedder),
            Err(e) => {
                warn!("{}; continuing without knowledge base", e);
                return None;
            }
        };

        match Self::build(dir, embedder, chunk_size) {
            Ok(kb) => kb,
            Err(e) => {
                warn!("Failed to build knowledge base: {}", e);
                None
            }
        }
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embeds a query with the same model used for the chunks.
    pub fn embed_query(&self, query: &str) -> Result<Vec<f32>, AppError> {
        self.embedder
            .embed(vec![query.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("No embedding generated".to_string()))
    }

    /// Top-`k` chunks for an already-embedded query, most similar first.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<RetrievalResult>, AppError> {
        let hits = self.index.search(query_vector, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|(id, score)| {
                self.chunks.get(id).map(|chunk| RetrievalResult {
                    content: chunk.text.clone(),
                    score,
                })
            })
            .collect())
    }

    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>, AppError> {
        let query_vector = self.embed_query(query)?;
        self.search(&query_vector, k)
    }
}

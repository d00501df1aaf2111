//! Knowledge base: document chunking, embeddings and the similarity index
//! used to ground reply drafts.

pub mod base;
pub mod chunker;
pub mod embedder;
pub mod index;

pub use base::{KnowledgeBase, KnowledgeChunk};
pub use chunker::chunk_text;
pub use embedder::{Embedder, FastEmbedder};
pub use index::FlatIpIndex;

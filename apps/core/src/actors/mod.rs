//! Actor system: a supervisor that pipelines each email, plus the LLM and
//! RAG actors it delegates generation and retrieval to.

pub mod llm;
pub mod messages;
pub mod rag;
pub mod supervisor;
pub mod traits;

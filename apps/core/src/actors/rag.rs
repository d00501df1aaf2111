use crate::actors::messages::{ActorError, AppError, RagMessage, RetrievalResult};
use crate::actors::traits::RagActor;
use crate::knowledge::KnowledgeBase;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// A handle to the `RagActor`.
///
/// This provides a public, cloneable interface for sending messages to the running RAG actor,
/// which owns the knowledge base and answers retrieval queries.
#[derive(Clone)]
pub struct RagActorHandle {
    sender: mpsc::Sender<RagMessage>,
}

impl RagActorHandle {
    /// Spawns a `RagActor` over an already-built knowledge base.
    ///
    /// `None` means no knowledge base is available: every query returns an
    /// empty list.
    pub fn new(knowledge_base: Option<KnowledgeBase>) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = RagActorRunner::new(receiver, knowledge_base);
        tokio::spawn(async move { actor.run().await });
        Self { sender }
    }
}

#[async_trait]
impl RagActor for RagActorHandle {
    async fn retrieve(&self, query: String, limit: usize) -> Result<Vec<RetrievalResult>, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = RagMessage::Retrieve {
            query,
            limit,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|_| AppError::Actor(ActorError::Internal("RAG Actor closed".to_string())))?;
        recv.await
            .map_err(|_| AppError::Actor(ActorError::Internal("RAG Actor failed to respond".to_string())))?
    }
}

// --- Actor Runner (Internal Logic) ---
struct RagActorRunner {
    receiver: mpsc::Receiver<RagMessage>,
    knowledge_base: Option<KnowledgeBase>,
    embedding_cache: LruCache<String, Vec<f32>>,
}

impl RagActorRunner {
    const CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(size) => size,
        None => panic!("Cache size must be non-zero"),
    };

    fn new(receiver: mpsc::Receiver<RagMessage>, knowledge_base: Option<KnowledgeBase>) -> Self {
        Self {
            receiver,
            knowledge_base,
            embedding_cache: LruCache::new(Self::CACHE_SIZE),
        }
    }

    async fn run(mut self) {
        match &self.knowledge_base {
            Some(kb) => info!("RagActor started with {} chunk(s)", kb.len()),
            None => info!("RagActor started without a knowledge base"),
        }

        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg);
        }
        info!("RagActor stopped");
    }

    fn handle_message(&mut self, msg: RagMessage) {
        match msg {
            RagMessage::Retrieve {
                query,
                limit,
                responder,
            } => {
                let result = self.retrieve(query, limit);
                if responder.send(result).is_err() {
                    warn!("Failed to send retrieval response (channel closed)");
                }
            }
        }
    }

    fn retrieve(&mut self, query: String, limit: usize) -> Result<Vec<RetrievalResult>, AppError> {
        let Some(kb) = self.knowledge_base.as_ref() else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        // 1. Embed Query (with cache)
        let query_vec = match self.embedding_cache.get(&query) {
            Some(embedding) => {
                debug!("Cache hit for query embedding");
                embedding.clone()
            }
            None => {
                debug!("Cache miss for query embedding");
                let embedding = kb.embed_query(&query)?;
                self.embedding_cache.put(query, embedding.clone());
                embedding
            }
        };

        // 2. Exact inner-product search
        kb.search(&query_vec, limit)
    }
}

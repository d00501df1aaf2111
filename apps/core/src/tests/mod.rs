//! Test Module
//!
//! Cross-module test suite for the triage pipeline.
//!
//! ## Test Categories
//! - `brain_tests`: scoring and extraction properties over sample inboxes
//! - `database_tests`: email store CRUD, ordering and analytics
//! - `rag_tests`: knowledge-base indexing and the RAG actor
//! - `actor_tests`: reply drafting over a mocked LLM actor
//! - `supervisor_tests`: pipeline orchestration and failure handling
//! - `integration_tests`: CSV export to reviewed, resolved records

pub mod actor_tests;
pub mod brain_tests;

use crate::actors::messages::{ActorError, AppError, RetrievalResult};
use crate::actors::traits::{LlmActor, RagActor};
use crate::brain::{LexiconSentimentModel, SentimentClassifier, TriageAnalyzer};
use crate::knowledge::Embedder;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Shared Fixtures
// ============================================================================

/// Deterministic embedder: one axis per topic word plus a constant bias, so
/// similarity follows shared vocabulary.
#[derive(Default)]
pub struct KeywordAxisEmbedder {
    calls: AtomicUsize,
}

impl KeywordAxisEmbedder {
    const AXES: [&'static str; 4] = ["refund", "api", "latency", "password"];

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for KeywordAxisEmbedder {
    fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                let mut vector: Vec<f32> = Self::AXES
                    .iter()
                    .map(|axis| if lower.contains(axis) { 1.0 } else { 0.0 })
                    .collect();
                vector.push(0.1);
                vector
            })
            .collect())
    }
}

/// Analyzer backed by the offline lexicon model.
pub fn lexicon_analyzer() -> TriageAnalyzer {
    TriageAnalyzer::new(SentimentClassifier::new(Arc::new(LexiconSentimentModel)))
}

/// What the mock LLM answers.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail,
}

/// LLM actor that records every prompt it receives.
pub struct MockLlm {
    reply: MockReply,
    prompts: Mutex<Vec<(String, Option<String>, Option<f32>)>>,
}

impl MockLlm {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(String, Option<String>, Option<f32>)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmActor for MockLlm {
    async fn generate_with_params(
        &self,
        prompt: String,
        system_prompt: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt, system_prompt, temperature));
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Fail => Err(AppError::Actor(ActorError::LlmError(
                "LLM simulation error".to_string(),
            ))),
        }
    }
}

/// RAG actor returning canned chunks (or failing), recording queries.
pub struct StaticRag {
    results: Option<Vec<RetrievalResult>>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticRag {
    pub fn with_results(results: Vec<RetrievalResult>) -> Self {
        Self {
            results: Some(results),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RagActor for StaticRag {
    async fn retrieve(&self, query: String, limit: usize) -> Result<Vec<RetrievalResult>, AppError> {
        self.queries.lock().unwrap().push((query, limit));
        match &self.results {
            Some(results) => Ok(results.iter().take(limit).cloned().collect()),
            None => Err(AppError::Actor(ActorError::RagError(
                "RAG simulation error".to_string(),
            ))),
        }
    }
}

pub fn chunk(content: &str, score: f32) -> RetrievalResult {
    RetrievalResult {
        content: content.to_string(),
        score,
    }
}

//! # Brain Module
//!
//! Fast, non-generative analysis of inbound support emails.
//! Runs BEFORE retrieval and drafting to decide what the operator sees first.
//!
//! ## Components
//! - `keywords`: closed keyword vocabularies
//! - `extractor`: email / phone / topic / cue extraction
//! - `sentiment`: three-way sentiment over a binary model
//! - `priority`: urgency score and label
//! - `analyzer`: main orchestrator

pub mod analyzer;
pub mod extractor;
pub mod keywords;
pub mod priority;
pub mod sentiment;

pub use analyzer::{TriageAnalyzer, TriageSignals};
pub use extractor::InfoExtractor;
pub use priority::compute_priority;
pub use sentiment::{
    BinaryLabel, HttpSentimentModel, LexiconSentimentModel, SentimentClassifier, SentimentModel,
    SentimentPrediction,
};

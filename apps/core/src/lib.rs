//! Support inbox triage.
//!
//! Scores and classifies inbound support emails, retrieves knowledge-base
//! context for them, drafts a reply, and stores everything for human review.

pub mod actors;
pub mod brain;
pub mod config;
pub mod database;
pub mod drafter;
pub mod error;
pub mod fs_manager;
pub mod ingest;
pub mod knowledge;
pub mod models;
pub mod preflight;
pub mod text_extract;

#[cfg(test)]
mod tests;

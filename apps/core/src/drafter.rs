//! Reply drafting.
//!
//! A draft is generated by the language model when one is configured and
//! answers; otherwise a deterministic template is filled in from the email and
//! its extracted topics.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::actors::messages::RetrievalResult;
use crate::actors::traits::LlmActor;
use crate::models::{DraftSource, ExtractedInfo, Topic};

pub const SYSTEM_PROMPT: &str =
    "You are a helpful, empathetic customer support assistant. Keep replies concise and professional.";

const SUMMARY_CHARS: usize = 200;

/// A drafted reply and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "text", rename_all = "lowercase")]
pub enum DraftReply {
    Generated(String),
    Templated(String),
}

impl DraftReply {
    pub fn text(&self) -> &str {
        match self {
            DraftReply::Generated(text) | DraftReply::Templated(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            DraftReply::Generated(text) | DraftReply::Templated(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, DraftReply::Generated(_))
    }

    pub fn source(&self) -> DraftSource {
        match self {
            DraftReply::Generated(_) => DraftSource::Generated,
            DraftReply::Templated(_) => DraftSource::Templated,
        }
    }
}

/// Builds the grounded generation prompt.
pub fn build_prompt(sender: &str, subject: &str, body: &str, context: &[RetrievalResult]) -> String {
    let kb_text = context
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "
You are a customer support AI. Craft a concise, empathetic reply.
Context from knowledge base (may include policies, product info, troubleshooting):
---
{kb_text}
---

Sender: {sender}
Subject: {subject}
Email body:
{body}

Requirements:
- Professional, friendly tone
- Acknowledge any frustration if applicable
- Reference relevant product/policy info from the context
- Provide next steps and set expectations (SLA if urgent)
- Keep to 8-12 sentences maximum
"
    )
}

/// Next-step lines for the templated reply. The access line is always present.
pub fn guidance_for(extracted: &ExtractedInfo) -> String {
    let mut guidance = String::from("- We'll verify your access and role permissions.\n");
    if extracted.mentions(Topic::Billing) {
        guidance.push_str(
            "- We'll audit the invoice IDs and initiate a refund if applicable within 5 business days.\n",
        );
    }
    if extracted.mentions(Topic::Api) {
        guidance.push_str("- We'll share API/CRM integration details and best practices.\n");
    }
    if extracted.mentions(Topic::Latency) {
        guidance.push_str(
            "- We'll check regional status and suggest retries with backoff if needed.\n",
        );
    }
    guidance.trim().to_string()
}

/// Greeting name: the local part of the sender address.
fn customer_name(sender: &str) -> &str {
    sender.split('@').next().unwrap_or_default()
}

fn body_summary(body: &str) -> String {
    let head: String = body.chars().take(SUMMARY_CHARS).collect();
    head.trim().replace('\n', " ")
}

/// Deterministic reply used whenever generation is unavailable.
pub fn fallback_reply(sender: &str, subject: &str, body: &str, extracted: &ExtractedInfo) -> String {
    let name = match customer_name(sender) {
        "" => "there",
        name => name,
    };
    let summary = body_summary(body);
    let guidance = guidance_for(extracted);

    format!(
        "Hi {name},

Thanks for reaching out regarding \"{subject}\". We understand the importance of this and we\u{2019}re here to help.

Summary of your issue:
- {summary}

What we\u{2019}ll do next:
{guidance}

If anything is urgent or if we missed context, please reply to this email and we\u{2019}ll prioritize immediately.

Best regards,
Support Team
"
    )
}

/// Drafts replies, preferring the language model when one is configured.
pub struct ReplyDrafter<L: LlmActor> {
    llm: Option<Arc<L>>,
    temperature: Option<f32>,
}

impl<L: LlmActor> Clone for ReplyDrafter<L> {
    fn clone(&self) -> Self {
        Self {
            llm: self.llm.clone(),
            temperature: self.temperature,
        }
    }
}

impl<L: LlmActor> ReplyDrafter<L> {
    pub fn new(llm: Option<Arc<L>>) -> Self {
        Self {
            llm,
            temperature: None,
        }
    }

    /// Template-only drafter.
    pub fn templated() -> Self {
        Self::new(None)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn generation_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Drafts a reply. Never fails: any generation problem yields the template.
    pub async fn draft(
        &self,
        sender: &str,
        subject: &str,
        body: &str,
        extracted: &ExtractedInfo,
        context: &[RetrievalResult],
    ) -> DraftReply {
        if let Some(llm) = &self.llm {
            let prompt = build_prompt(sender, subject, body, context);
            match llm
                .generate_with_params(prompt, Some(SYSTEM_PROMPT.to_string()), self.temperature)
                .await
            {
                Ok(text) if !text.trim().is_empty() => {
                    return DraftReply::Generated(text.trim().to_string())
                }
                Ok(_) => warn!("Generation returned an empty reply; using template"),
                Err(e) => warn!("Generation failed, using template: {}", e),
            }
        } else {
            debug!("No generation backend configured; using template");
        }

        DraftReply::Templated(fallback_reply(sender, subject, body, extracted))
    }
}

//! Actor Tests
//!
//! Reply drafting over a mocked `LlmActor`: grounded prompts, provenance, and
//! the template fallback on every generation failure mode.

use super::{chunk, MockLlm, MockReply};
use crate::drafter::{fallback_reply, DraftReply, ReplyDrafter, SYSTEM_PROMPT};
use crate::models::{DraftSource, ExtractedInfo, Topic};
use std::sync::Arc;

fn billing_info() -> ExtractedInfo {
    ExtractedInfo {
        mentioned_topics: [Topic::Billing].into_iter().collect(),
        ..Default::default()
    }
}

#[cfg(test)]
mod drafter_tests {
    use super::*;

    #[tokio::test]
    async fn test_generated_reply_is_trimmed_and_tagged() {
        // Arrange
        let llm = Arc::new(MockLlm::new(MockReply::Text(
            "  Hello Jane, we are on it.  \n".to_string(),
        )));
        let drafter = ReplyDrafter::new(Some(llm.clone())).with_temperature(0.3);

        // Act
        let reply = drafter
            .draft("jane@acme.com", "Billing", "Charged twice", &billing_info(), &[])
            .await;

        // Assert
        assert_eq!(reply, DraftReply::Generated("Hello Jane, we are on it.".to_string()));
        assert_eq!(reply.source(), DraftSource::Generated);
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].1.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(prompts[0].2, Some(0.3));
    }

    #[tokio::test]
    async fn test_prompt_carries_context_and_email() {
        let llm = Arc::new(MockLlm::new(MockReply::Text("ok".to_string())));
        let drafter = ReplyDrafter::new(Some(llm.clone()));
        let context = vec![
            chunk("Refunds take five business days.", 0.9),
            chunk("Invoices are emailed monthly.", 0.5),
        ];

        drafter
            .draft(
                "jane@acme.com",
                "Billing discrepancy",
                "I was billed twice.",
                &billing_info(),
                &context,
            )
            .await;

        let prompt = &llm.prompts()[0].0;
        assert!(prompt
            .contains("Refunds take five business days.\n\nInvoices are emailed monthly."));
        assert!(prompt.contains("Sender: jane@acme.com"));
        assert!(prompt.contains("Subject: Billing discrepancy"));
        assert!(prompt.contains("Email body:\nI was billed twice."));
        assert!(prompt.contains("- Keep to 8-12 sentences maximum"));
    }

    #[tokio::test]
    async fn test_generation_failure_falls_back_to_template() {
        let llm = Arc::new(MockLlm::new(MockReply::Fail));
        let drafter = ReplyDrafter::new(Some(llm.clone()));

        let reply = drafter
            .draft("jane@acme.com", "Billing", "Charged twice", &billing_info(), &[])
            .await;

        assert_eq!(llm.prompts().len(), 1);
        assert_eq!(
            reply,
            DraftReply::Templated(fallback_reply(
                "jane@acme.com",
                "Billing",
                "Charged twice",
                &billing_info()
            ))
        );
    }

    #[tokio::test]
    async fn test_blank_generation_falls_back_to_template() {
        let llm = Arc::new(MockLlm::new(MockReply::Text(" \n\t".to_string())));
        let drafter = ReplyDrafter::new(Some(llm));

        let reply = drafter
            .draft("jane@acme.com", "Billing", "Charged twice", &billing_info(), &[])
            .await;

        assert!(!reply.is_generated());
        assert!(reply.text().starts_with("Hi jane,"));
    }

    #[tokio::test]
    async fn test_templated_drafter_never_calls_llm() {
        let drafter = ReplyDrafter::<MockLlm>::templated();
        assert!(!drafter.generation_enabled());

        let reply = drafter
            .draft("", "Question", "", &ExtractedInfo::default(), &[chunk("ctx", 1.0)])
            .await;

        assert_eq!(reply.source(), DraftSource::Templated);
        assert!(reply.text().starts_with("Hi there,"));
        assert!(reply.text().contains("\"Question\""));
        assert!(!reply.text().contains("refund"));
    }
}

use crate::actors::messages::{ActorError, AppError, LlmMessage};
use crate::actors::traits::LlmActor;
use crate::config::GenerationConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// A handle to the `LlmActor`.
///
/// This struct provides a public, cloneable interface for sending messages to the
/// running LLM actor. It abstracts away the `mpsc::Sender`.
#[derive(Clone)]
pub struct LlmActorHandle {
    sender: mpsc::Sender<LlmMessage>,
    reply_timeout: Duration,
}

impl LlmActorHandle {
    /// Creates a new `LlmActor` talking to an OpenAI-compatible
    /// chat-completions endpoint and returns a handle to it.
    ///
    /// This will spawn the `LlmActorRunner` in a new Tokio task.
    pub fn new(config: GenerationConfig) -> Result<Self, AppError> {
        let (sender, receiver) = mpsc::channel(32);
        // The HTTP client enforces the request timeout; the handle allows a little slack on top.
        let reply_timeout = config.timeout() + Duration::from_secs(5);
        let actor = LlmActorRunner::new(receiver, config)?;
        tokio::spawn(async move { actor.run().await });
        Ok(Self {
            sender,
            reply_timeout,
        })
    }

    /// A convenience method for generating text with default parameters.
    pub async fn generate(&self, prompt: String) -> Result<String, AppError> {
        self.generate_with_params(prompt, None, None).await
    }
}

#[async_trait]
impl LlmActor for LlmActorHandle {
    async fn generate_with_params(
        &self,
        prompt: String,
        system_prompt: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = LlmMessage::Generate {
            prompt,
            system_prompt,
            temperature,
            responder: send,
        };

        self.sender
            .send(msg)
            .await
            .map_err(|_| AppError::Actor(ActorError::Internal("LLM Actor closed".to_string())))?;
        timeout(self.reply_timeout, recv)
            .await?
            .map_err(|_| AppError::Actor(ActorError::Internal("LLM Actor failed to respond".to_string())))?
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// --- Actor Runner (Internal Logic) ---
struct LlmActorRunner {
    receiver: mpsc::Receiver<LlmMessage>,
    client: Client,
    config: GenerationConfig,
}

impl LlmActorRunner {
    fn new(receiver: mpsc::Receiver<LlmMessage>, config: GenerationConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            receiver,
            client,
            config,
        })
    }

    async fn run(mut self) {
        info!("LlmActor started (model: {})", self.config.model);

        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }

        info!("LlmActor stopped");
    }

    async fn handle_message(&mut self, msg: LlmMessage) {
        match msg {
            LlmMessage::Generate {
                prompt,
                system_prompt,
                temperature,
                responder,
            } => {
                let result = self
                    .generate_completion(prompt, system_prompt, temperature)
                    .await;
                if responder.send(result).is_err() {
                    warn!("Failed to send generation response (channel closed)");
                }
            }
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    async fn generate_completion(
        &self,
        prompt: String,
        system_prompt: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        debug!("LLM generating for prompt of {} chars", prompt.len());

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt,
        });

        let payload = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: temperature.unwrap_or(self.config.temperature),
        };

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Actor(ActorError::LlmError(format!(
                "Completion request failed with status {}: {}",
                status, body
            ))));
        }

        let response: ChatResponse = res.json().await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(AppError::Actor(ActorError::LlmError(
                "Completion returned no content".to_string(),
            )));
        }
        Ok(content)
    }
}

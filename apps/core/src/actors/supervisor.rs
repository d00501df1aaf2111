use crate::actors::llm::LlmActorHandle;
use crate::actors::messages::{ActorError, AppError, SupervisorMessage};
use crate::actors::rag::RagActorHandle;
use crate::actors::traits::{LlmActor, RagActor};
use crate::brain::{SentimentClassifier, TriageAnalyzer};
use crate::config::AppConfig;
use crate::database;
use crate::drafter::ReplyDrafter;
use crate::ingest::{resolve_sent_at, IncomingEmail};
use crate::knowledge::KnowledgeBase;
use crate::models::{NewEmailRecord, ProcessedEmail};
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{error, info, instrument, warn};

/// Upper bound for one email to go through the whole pipeline.
const DEFAULT_EMAIL_TIMEOUT: Duration = Duration::from_secs(120);

/// A handle to the `SupervisorActor`.
///
/// This is the primary entry point for triage. It owns the analysis stage and
/// the drafter, queries the `RagActor` for context, and persists every result.
/// Emails are processed one at a time, in submission order.
#[derive(Clone)]
pub struct SupervisorHandle {
    sender: mpsc::Sender<SupervisorMessage>,
    email_timeout: Duration,
}

impl SupervisorHandle {
    /// Builds the production pipeline described by `config`.
    ///
    /// The knowledge base is built here, once; an LLM actor is spawned only
    /// when a generation credential is configured.
    pub async fn from_config(config: &AppConfig, db_pool: SqlitePool) -> Result<Self, AppError> {
        let kb_dir = config.kb_dir.clone();
        let cache_dir = config.paths.embeddings_dir();
        let chunk_size = config.retrieval.chunk_size;
        let knowledge_base =
            tokio::task::spawn_blocking(move || KnowledgeBase::load(&kb_dir, cache_dir, chunk_size))
                .await
                .map_err(|e| AppError::Internal(format!("Knowledge-base build task failed: {}", e)))?;

        let drafter = match &config.generation {
            Some(generation) => {
                let temperature = generation.temperature;
                let llm = LlmActorHandle::new(generation.clone())?;
                ReplyDrafter::new(Some(Arc::new(llm))).with_temperature(temperature)
            }
            None => {
                info!("No generation credential configured; replies will be templated");
                ReplyDrafter::<LlmActorHandle>::templated()
            }
        };

        let analyzer = TriageAnalyzer::new(SentimentClassifier::from_config(&config.sentiment));
        let rag_actor = Arc::new(RagActorHandle::new(knowledge_base));

        Ok(Self::with_actors(
            db_pool,
            analyzer,
            drafter,
            rag_actor,
            config.retrieval.top_k,
        ))
    }

    /// Spawns a supervisor over explicitly provided collaborators.
    pub fn with_actors<L, R>(
        db_pool: SqlitePool,
        analyzer: TriageAnalyzer,
        drafter: ReplyDrafter<L>,
        rag_actor: Arc<R>,
        top_k: usize,
    ) -> Self
    where
        L: LlmActor,
        R: RagActor,
    {
        let (sender, receiver) = mpsc::channel(32);
        let actor = SupervisorRunner::new(receiver, analyzer, drafter, rag_actor, db_pool, top_k);
        tokio::spawn(async move { actor.run().await });
        Self {
            sender,
            email_timeout: DEFAULT_EMAIL_TIMEOUT,
        }
    }

    pub fn with_email_timeout(mut self, email_timeout: Duration) -> Self {
        self.email_timeout = email_timeout;
        self
    }

    /// Runs one email through sentiment, extraction, priority, retrieval and
    /// drafting, then persists it with status `pending`.
    ///
    /// Only persistence failures (or a dead actor) are reported as errors.
    #[instrument(skip(self, email), fields(subject = %email.subject))]
    pub async fn process_email(&self, email: IncomingEmail) -> Result<ProcessedEmail, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = SupervisorMessage::ProcessEmail {
            email,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|_| AppError::Actor(ActorError::Internal("Supervisor closed".to_string())))?;
        timeout(self.email_timeout, recv)
            .await?
            .map_err(|_| AppError::Actor(ActorError::Internal("Supervisor failed to respond".to_string())))?
    }

    /// Processes `emails` in order. Stops at the first failure; records
    /// already persisted stay persisted.
    #[instrument(skip(self, emails), fields(batch_id = %uuid::Uuid::new_v4(), size = emails.len()))]
    pub async fn process_batch(
        &self,
        emails: Vec<IncomingEmail>,
    ) -> Result<Vec<ProcessedEmail>, AppError> {
        let mut processed = Vec::with_capacity(emails.len());
        for email in emails {
            processed.push(self.process_email(email).await?);
        }
        info!("Batch complete: {} email(s) processed", processed.len());
        Ok(processed)
    }

    /// Asks the supervisor to stop once queued emails are done.
    pub async fn shutdown(&self) {
        if self.sender.send(SupervisorMessage::Shutdown).await.is_err() {
            warn!("Supervisor already stopped");
        }
    }
}

// --- Actor Runner ---
struct SupervisorRunner<L, R>
where
    L: LlmActor,
    R: RagActor,
{
    receiver: mpsc::Receiver<SupervisorMessage>,
    analyzer: TriageAnalyzer,
    drafter: ReplyDrafter<L>,
    rag_actor: Arc<R>,
    db_pool: SqlitePool,
    top_k: usize,
}

impl<L, R> SupervisorRunner<L, R>
where
    L: LlmActor,
    R: RagActor,
{
    fn new(
        receiver: mpsc::Receiver<SupervisorMessage>,
        analyzer: TriageAnalyzer,
        drafter: ReplyDrafter<L>,
        rag_actor: Arc<R>,
        db_pool: SqlitePool,
        top_k: usize,
    ) -> Self {
        Self {
            receiver,
            analyzer,
            drafter,
            rag_actor,
            db_pool,
            top_k,
        }
    }

    async fn run(mut self) {
        info!(
            "Supervisor started (generation: {})",
            if self.drafter.generation_enabled() { "enabled" } else { "disabled" }
        );
        while let Some(msg) = self.receiver.recv().await {
            if !self.handle_message(msg).await {
                break;
            }
        }
        info!("Supervisor stopped");
    }

    /// Returns `false` when the supervisor should stop.
    async fn handle_message(&mut self, msg: SupervisorMessage) -> bool {
        match msg {
            SupervisorMessage::ProcessEmail { email, responder } => {
                let result = self.handle_email(email).await;
                if let Err(e) = &result {
                    error!("Error processing email: {}", e);
                }
                if responder.send(result).is_err() {
                    warn!("Failed to send processing result (channel closed)");
                }
                true
            }
            SupervisorMessage::Shutdown => {
                info!("Supervisor shutting down...");
                false
            }
        }
    }

    async fn handle_email(&mut self, email: IncomingEmail) -> Result<ProcessedEmail, AppError> {
        // 1. Sentiment, extraction, priority
        let signals = self.analyzer.analyze(&email.subject, &email.body).await;

        // 2. Knowledge-base context
        let context = match self.rag_actor.retrieve(email.text(), self.top_k).await {
            Ok(context) => context,
            Err(e) => {
                warn!("Retrieval failed, drafting without context: {}", e);
                Vec::new()
            }
        };

        // 3. Draft
        let draft = self
            .drafter
            .draft(
                &email.sender,
                &email.subject,
                &email.body,
                &signals.extracted,
                &context,
            )
            .await;

        // 4. Persist
        let sent_at = resolve_sent_at(email.sent_date.as_deref(), Utc::now());
        let record = NewEmailRecord {
            sender: email.sender,
            subject: email.subject,
            body: email.body,
            sent_at,
            sentiment: signals.sentiment,
            priority: signals.priority.label,
            priority_score: signals.priority.score,
            extracted_info: signals.extracted,
            draft_source: draft.source(),
            ai_response: draft.into_text(),
        };
        let id = database::insert_email(&self.db_pool, &record).await?;

        info!(
            "Stored email #{} ({}, {:.1}, {}, {} context chunk(s), {} draft)",
            id,
            record.priority,
            record.priority_score,
            record.sentiment,
            context.len(),
            record.draft_source,
        );
        Ok(ProcessedEmail { id, record })
    }
}

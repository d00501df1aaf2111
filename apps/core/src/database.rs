use crate::error::AppError;
use crate::models::{EmailRecord, EmailStats, EmailStatus, NewEmailRecord};
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use std::path::Path;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const EMAIL_COLUMNS: &str = r#"
    id, sender, subject, body, sent_at, sentiment, priority, priority_score,
    extracted_info, ai_response, draft_source, status, ingested_at
"#;

/// Opens (creating if missing) the store at `path` and applies migrations.
pub async fn init_db(path: &Path) -> Result<SqlitePool, AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!("Initializing database at: {}", path.display());

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!("Database initialized and migrations applied.");

    Ok(pool)
}

/// In-memory store with the schema applied. A single connection keeps the
/// database alive for the lifetime of the pool.
pub async fn init_memory_db() -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

// --- Emails CRUD ---

pub async fn insert_email(pool: &SqlitePool, record: &NewEmailRecord) -> Result<i64, AppError> {
    let ingested_at = Utc::now().timestamp();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO emails (
            sender, subject, body, sent_at, sentiment, priority, priority_score,
            extracted_info, ai_response, draft_source, status, ingested_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&record.sender)
    .bind(&record.subject)
    .bind(&record.body)
    .bind(record.sent_at)
    .bind(record.sentiment)
    .bind(record.priority)
    .bind(record.priority_score)
    .bind(Json(record.extracted_info.clone()))
    .bind(&record.ai_response)
    .bind(record.draft_source)
    .bind(EmailStatus::Pending)
    .bind(ingested_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Lists every stored email.
///
/// With `order_by_priority`, urgent emails come first, then higher scores,
/// then the most recent. Otherwise the most recent come first.
pub async fn list_emails(
    pool: &SqlitePool,
    order_by_priority: bool,
) -> Result<Vec<EmailRecord>, AppError> {
    let order = if order_by_priority {
        "priority = 'Urgent' DESC, priority_score DESC, sent_at DESC, id DESC"
    } else {
        "sent_at DESC, id DESC"
    };
    let sql = format!("SELECT {} FROM emails ORDER BY {}", EMAIL_COLUMNS, order);

    let emails = sqlx::query_as::<_, EmailRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(emails)
}

pub async fn get_email(pool: &SqlitePool, id: i64) -> Result<EmailRecord, AppError> {
    let sql = format!("SELECT {} FROM emails WHERE id = ?", EMAIL_COLUMNS);

    sqlx::query_as::<_, EmailRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("email {}", id)))
}

pub async fn update_email_status(
    pool: &SqlitePool,
    id: i64,
    status: EmailStatus,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE emails SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("email {}", id)));
    }
    Ok(())
}

pub async fn update_ai_response(pool: &SqlitePool, id: i64, text: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE emails SET ai_response = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("email {}", id)));
    }
    Ok(())
}

// --- Analytics ---

pub async fn email_stats(pool: &SqlitePool) -> Result<EmailStats, AppError> {
    let (total, urgent, pending, resolved): (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(priority = 'Urgent'), 0),
            COALESCE(SUM(status = 'pending'), 0),
            COALESCE(SUM(status = 'resolved'), 0)
        FROM emails
        "#,
    )
    .fetch_one(pool)
    .await?;

    let by_sentiment: Vec<(String, i64)> =
        sqlx::query_as("SELECT sentiment, COUNT(*) FROM emails GROUP BY sentiment")
            .fetch_all(pool)
            .await?;
    let by_priority: Vec<(String, i64)> =
        sqlx::query_as("SELECT priority, COUNT(*) FROM emails GROUP BY priority")
            .fetch_all(pool)
            .await?;

    Ok(EmailStats {
        total,
        urgent,
        pending,
        resolved,
        by_sentiment: by_sentiment.into_iter().collect(),
        by_priority: by_priority.into_iter().collect(),
    })
}

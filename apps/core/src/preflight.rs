//! Preflight Check System
//!
//! Verifies the environment the triage pipeline depends on: directories,
//! knowledge-base documents, embedding model cache, database, and the
//! optional external models. Only directories and database are critical;
//! everything else degrades gracefully at runtime.

use crate::config::{AppConfig, SentimentBackend};
use crate::text_extract::list_documents;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const MIN_EMBEDDINGS_SIZE_BYTES: u64 = 20 * 1024 * 1024; // 20 MB minimum for ONNX

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    pub ready_to_start: bool,
    pub summary: String,
}

/// Performs all preflight checks and returns a report
pub async fn run_preflight_checks(config: &AppConfig) -> PreflightReport {
    info!("Running preflight checks");

    let checks = vec![
        check_directories(config),
        check_kb_documents(&config.kb_dir),
        check_embeddings(&config.paths.embeddings_dir()),
        check_database(&config.db_path).await,
        check_generation(config),
        check_sentiment(config),
    ];

    let all_passed = checks.iter().all(|c| c.passed);
    let critical_passed = checks
        .iter()
        .filter(|c| is_critical_check(&c.name))
        .all(|c| c.passed);

    let summary = if all_passed {
        "All checks passed. System ready.".to_string()
    } else if critical_passed {
        "Some non-critical checks failed. Triage will run in degraded mode.".to_string()
    } else {
        "Critical checks failed. Triage cannot run.".to_string()
    };

    for check in &checks {
        if check.passed {
            info!("  ok   {}: {}", check.name, check.message);
        } else {
            warn!("  FAIL {}: {}", check.name, check.message);
            if let Some(details) = &check.details {
                warn!("      Details: {}", details);
            }
        }
    }
    info!("Summary: {}", summary);

    PreflightReport {
        all_passed,
        checks,
        ready_to_start: critical_passed,
        summary,
    }
}

fn is_critical_check(name: &str) -> bool {
    matches!(name, "directories" | "database")
}

// --- Individual Checks ---

fn check_directories(config: &AppConfig) -> CheckResult {
    let paths = &config.paths;
    let mut dirs = vec![
        ("data", paths.data_dir()),
        ("models", paths.models_dir()),
    ];
    if let Some(db_dir) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        dirs.push(("db", db_dir.to_path_buf()));
    }

    let mut missing = Vec::new();
    let mut created = Vec::new();

    for (name, path) in &dirs {
        if !path.exists() {
            match std::fs::create_dir_all(path) {
                Ok(_) => created.push(*name),
                Err(e) => missing.push(format!("{}: {}", name, e)),
            }
        }
    }

    if missing.is_empty() {
        if created.is_empty() {
            CheckResult::pass("directories", "All directories exist")
        } else {
            CheckResult::pass(
                "directories",
                &format!("Created missing directories: {}", created.join(", ")),
            )
        }
    } else {
        CheckResult::fail(
            "directories",
            "Failed to create directories",
            Some(missing.join(", ")),
        )
    }
}

fn check_kb_documents(kb_dir: &Path) -> CheckResult {
    match list_documents(kb_dir) {
        Ok(docs) if docs.is_empty() => CheckResult::fail(
            "kb_documents",
            "No knowledge-base documents; replies will not cite context",
            Some(format!("Expected .md or .txt files in {:?}", kb_dir)),
        ),
        Ok(docs) => CheckResult::pass(
            "kb_documents",
            &format!("{} document(s) in {:?}", docs.len(), kb_dir),
        ),
        Err(e) => CheckResult::fail(
            "kb_documents",
            "Cannot read knowledge-base directory",
            Some(e.to_string()),
        ),
    }
}

/// Total size of the directory tree and whether it holds an ONNX file.
fn scan_model_cache(dir: &Path) -> (u64, bool) {
    let mut total_size = 0;
    let mut onnx_found = false;

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let (size, onnx) = scan_model_cache(&path);
                total_size += size;
                onnx_found |= onnx;
            } else if let Ok(meta) = entry.metadata() {
                total_size += meta.len();
                onnx_found |= path.extension().is_some_and(|e| e == "onnx");
            }
        }
    }
    (total_size, onnx_found)
}

fn check_embeddings(embeddings_dir: &Path) -> CheckResult {
    if !embeddings_dir.exists() {
        return CheckResult::fail(
            "embeddings",
            "Embedding model not downloaded yet (fetched on first ingest)",
            Some(format!("Expected at: {:?}", embeddings_dir)),
        );
    }

    let (total_size, onnx_found) = scan_model_cache(embeddings_dir);

    if total_size >= MIN_EMBEDDINGS_SIZE_BYTES && onnx_found {
        CheckResult::pass(
            "embeddings",
            &format!("Embeddings OK ({:.2} MB)", total_size as f64 / 1024.0 / 1024.0),
        )
    } else if total_size > 0 {
        CheckResult::fail(
            "embeddings",
            "Embeddings incomplete",
            Some(format!("Size: {} bytes, ONNX found: {}", total_size, onnx_found)),
        )
    } else {
        CheckResult::fail("embeddings", "Embeddings directory empty", None)
    }
}

async fn check_database(db_path: &Path) -> CheckResult {
    if !db_path.exists() {
        return CheckResult::pass("database", "Database will be created on first ingest");
    }

    let options = sqlx::sqlite::SqliteConnectOptions::new().filename(db_path);
    match sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
    {
        Ok(pool) => {
            let tables = sqlx::query_scalar::<_, String>(
                "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
            )
            .fetch_all(&pool)
            .await;

            match tables {
                Ok(tables) if tables.iter().any(|t| t == "emails") => {
                    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM emails")
                        .fetch_one(&pool)
                        .await
                        .unwrap_or_default();
                    CheckResult::pass("database", &format!("Database OK ({} email(s))", count))
                }
                Ok(_) => CheckResult::fail(
                    "database",
                    "Missing tables (migrations needed)",
                    Some("Missing: emails".to_string()),
                ),
                Err(e) => CheckResult::fail("database", "Cannot query database", Some(e.to_string())),
            }
        }
        Err(e) => CheckResult::fail("database", "Cannot connect to database", Some(e.to_string())),
    }
}

fn check_generation(config: &AppConfig) -> CheckResult {
    match &config.generation {
        Some(generation) => CheckResult::pass(
            "generation",
            &format!("AI drafting enabled ({} via {})", generation.model, generation.api_base),
        ),
        None => CheckResult::fail(
            "generation",
            "OPENAI_API_KEY not set; replies will use the template",
            None,
        ),
    }
}

fn check_sentiment(config: &AppConfig) -> CheckResult {
    match &config.sentiment.backend {
        SentimentBackend::Lexicon => CheckResult::pass("sentiment", "Local lexicon model"),
        SentimentBackend::Http {
            api_base,
            model,
            api_token,
        } => {
            let message = format!("Remote model {} at {}", model, api_base);
            if api_token.is_some() {
                CheckResult::pass("sentiment", &message)
            } else {
                CheckResult::fail(
                    "sentiment",
                    &message,
                    Some("SENTIMENT_API_TOKEN not set; requests may be rejected".to_string()),
                )
            }
        }
    }
}

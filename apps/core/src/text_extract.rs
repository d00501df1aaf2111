//! Knowledge-base document loading.
//! Supports: TXT, MD

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::AppError;

const SUPPORTED_EXTENSIONS: &[&str] = &["md", "txt"];

/// A knowledge-base document read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name, used to attribute chunks.
    pub name: String,
    pub content: String,
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

pub fn is_supported(file_name: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(file_name).as_str())
}

/// Extract text content from file data based on file extension
pub fn extract_text_from_file(file_name: &str, file_data: &[u8]) -> Result<String, AppError> {
    let extension = extension_of(file_name);

    match extension.as_str() {
        "txt" | "md" => String::from_utf8(file_data.to_vec())
            .map_err(|e| AppError::Validation(format!("Invalid UTF-8 content in {}: {}", file_name, e))),
        _ => Err(AppError::Validation(format!(
            "Unsupported file extension: {}",
            extension
        ))),
    }
}

/// Lists the supported documents directly inside `dir`, in sorted path order.
///
/// A missing directory yields an empty list.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_supported);
        if supported {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Reads every supported document in `dir`. Files that are not valid UTF-8
/// are skipped with a warning.
pub fn load_documents(dir: &Path) -> Result<Vec<SourceDocument>, AppError> {
    let mut documents = Vec::new();

    for path in list_documents(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = fs::read(&path)?;

        match extract_text_from_file(&name, &data) {
            Ok(content) => documents.push(SourceDocument { name, content }),
            Err(e) => warn!("Skipping knowledge-base document {:?}: {}", path, e),
        }
    }

    info!(
        "Loaded {} knowledge-base document(s) from {:?}",
        documents.len(),
        dir
    );
    Ok(documents)
}

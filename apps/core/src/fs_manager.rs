use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolves the on-disk layout below a single root directory.
///
/// ```text
/// <root>/data/db      SQLite store
/// <root>/data/models  embedding model cache
/// <root>/kb           knowledge-base documents (default)
/// ```
#[derive(Debug, Clone)]
pub struct PortablePathManager {
    root: PathBuf,
}

impl PortablePathManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses the current working directory as root.
    pub fn from_current_dir() -> Result<Self, std::io::Error> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// Main data directory (./data).
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Database directory (./data/db).
    pub fn db_dir(&self) -> PathBuf {
        self.data_dir().join("db")
    }

    /// Model directory (./data/models).
    pub fn models_dir(&self) -> PathBuf {
        self.data_dir().join("models")
    }

    /// Embedding model cache (./data/models/embeddings).
    pub fn embeddings_dir(&self) -> PathBuf {
        self.models_dir().join("embeddings")
    }

    /// Default knowledge-base directory (./kb).
    pub fn kb_dir(&self) -> PathBuf {
        self.root.join("kb")
    }

    /// Default database file.
    pub fn default_db_path(&self) -> PathBuf {
        self.db_dir().join("supportdesk.sqlite")
    }

    /// Creates the data, db and models directories if they don't exist.
    pub fn init(&self) -> Result<(), std::io::Error> {
        for dir in [self.data_dir(), self.db_dir(), self.models_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout() {
        let paths = PortablePathManager::new("/srv/desk");
        assert_eq!(paths.db_dir(), PathBuf::from("/srv/desk/data/db"));
        assert_eq!(
            paths.embeddings_dir(),
            PathBuf::from("/srv/desk/data/models/embeddings")
        );
        assert_eq!(paths.kb_dir(), PathBuf::from("/srv/desk/kb"));
    }

    #[test]
    fn test_init_creates_directories() {
        let dir = tempdir().expect("Failed to create temp dir");
        let paths = PortablePathManager::new(dir.path());

        paths.init().expect("init failed");
        paths.init().expect("init must be idempotent");

        assert!(paths.db_dir().is_dir());
        assert!(paths.models_dir().is_dir());
    }
}

//! File-backed history store.
//!
//! The whole document is read, mutated and rewritten on every write. There is
//! no locking: two processes recording into the same file race and the last
//! writer wins.

use scry_common::history::{EmptyReason, History, HistoryLoad, HistoryRecord, Upsert};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to write history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing document. Never fails; see [`HistoryLoad`].
    pub async fn load(&self) -> HistoryLoad {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => History::parse(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => HistoryLoad::Empty(EmptyReason::Missing),
            Err(e) => HistoryLoad::Empty(EmptyReason::Unreadable(e.to_string())),
        }
    }

    /// Like [`load`](Self::load), logging why the history came back empty.
    pub async fn load_history(&self) -> History {
        let loaded = self.load().await;
        match loaded.empty_reason() {
            Some(EmptyReason::Missing) => {
                debug!("No history at {}, starting empty", self.path.display())
            }
            Some(reason) => info!("Ignoring history at {}: {}", self.path.display(), reason),
            None => {}
        }
        loaded.into_history()
    }

    /// Replace the backing document with `history`.
    ///
    /// The new content goes to a sibling temp file that is then renamed over
    /// the target, so readers see either the old or the new document.
    pub async fn save(&self, history: &History) -> Result<(), HistoryError> {
        let json = history.to_json()?;
        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }

    pub async fn find_latest_successful(
        &self,
        description: &str,
        page_url: &str,
    ) -> Option<HistoryRecord> {
        self.load_history()
            .await
            .find_latest_successful(description, page_url)
            .cloned()
    }

    /// Load, upsert `record`, save.
    pub async fn record(&self, record: HistoryRecord) -> Result<Upsert, HistoryError> {
        let mut history = self.load_history().await;
        let key = record.key().to_string();
        let outcome = history.upsert(record);
        match outcome {
            Upsert::Updated(index) => debug!("Updating history item {} at index {}", key, index),
            Upsert::Appended(_) => debug!("Adding history item {}", key),
        }
        self.save(&history).await?;
        Ok(outcome)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

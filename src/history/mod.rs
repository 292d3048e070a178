pub mod export;
mod file;
mod memory;

use async_trait::async_trait;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::models::chat::Transcript;

pub use self::file::JsonFileStore;
pub use self::memory::MemoryStore;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("transcript file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("transcript I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the session's transcript lives between runs.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// A store with nothing saved yet yields an empty transcript.
    async fn load(&self) -> Result<Transcript, HistoryError>;

    async fn save(&self, transcript: &Transcript) -> Result<(), HistoryError>;

    fn describe(&self) -> String;
}

pub fn create_history_store(memory_file: Option<PathBuf>) -> Arc<dyn TranscriptStore> {
    let store: Arc<dyn TranscriptStore> = match memory_file {
        Some(path) => Arc::new(JsonFileStore::new(path)),
        None => Arc::new(MemoryStore::default()),
    };
    info!("Chat history will be stored in: {}", store.describe());
    store
}

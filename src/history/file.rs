use async_trait::async_trait;
use log::{ debug, info, warn };
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use tokio::fs;

use super::{ HistoryError, TranscriptStore };
use crate::models::chat::Transcript;

/// Pretty-printed JSON array on disk, replaced wholesale on every save.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("transcript"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> HistoryError {
        HistoryError::Io { path: path.to_path_buf(), source }
    }
}

#[async_trait]
impl TranscriptStore for JsonFileStore {
    async fn load(&self) -> Result<Transcript, HistoryError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No transcript at {}, starting fresh", self.path.display());
                return Ok(Transcript::new());
            }
            Err(e) => {
                return Err(self.io_error(&self.path, e));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Transcript::new());
        }

        let transcript: Transcript = serde_json::from_str(&raw).map_err(|source| {
            HistoryError::Corrupt { path: self.path.clone(), source }
        })?;
        info!("Loaded {} messages from {}", transcript.len(), self.path.display());
        Ok(transcript)
    }

    async fn save(&self, transcript: &Transcript) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| self.io_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(transcript)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json.as_bytes()).await.map_err(|e| self.io_error(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!("Could not remove {}: {}", tmp.display(), cleanup);
            }
            return Err(self.io_error(&self.path, e));
        }
        debug!("Saved {} messages to {}", transcript.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChatMessage;

    fn sample() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("Pizza or burger?"));
        transcript.push(ChatMessage::assistant("💡 Pizza.\n\n✅ Definitely pizza."));
        transcript
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("chat_memory.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("chat_memory.json"));
        let transcript = sample();

        store.save(&transcript).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, transcript);

        store.save(&loaded).await.unwrap();
        assert_eq!(store.load().await.unwrap(), transcript);
    }

    #[tokio::test]
    async fn writes_indented_array_and_cleans_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chat_memory.json");
        let store = JsonFileStore::new(&path);
        store.save(&sample()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {"));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["role"], "user");
        assert!(value[0]["timestamp"].is_string());
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_not_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_memory.json");
        std::fs::write(&path, "{ not a transcript").unwrap();

        let store = JsonFileStore::new(&path);
        match store.load().await {
            Err(HistoryError::Corrupt { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected corrupt error, got {:?}", other),
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not a transcript");
    }

    #[tokio::test]
    async fn unknown_role_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_memory.json");
        std::fs::write(&path, r#"[{"role":"system","content":"x","timestamp":"t"}]"#).unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load().await, Err(HistoryError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_memory.json");
        std::fs::create_dir(&path).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.save(&sample()).await, Err(HistoryError::Io { .. })));
        assert!(!store.temp_path().exists());
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn blank_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_memory.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStore::new(&path).load().await.unwrap().is_empty());
    }
}

use async_trait::async_trait;
use std::sync::Mutex;

use super::{ HistoryError, TranscriptStore };
use crate::models::chat::Transcript;

/// Keeps the last saved transcript in process memory only.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Transcript>>,
}

impl MemoryStore {
    pub fn with_transcript(transcript: Transcript) -> Self {
        Self { saved: Mutex::new(Some(transcript)) }
    }
}

#[async_trait]
impl TranscriptStore for MemoryStore {
    async fn load(&self) -> Result<Transcript, HistoryError> {
        let saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(saved.clone().unwrap_or_default())
    }

    async fn save(&self, transcript: &Transcript) -> Result<(), HistoryError> {
        let mut saved = self.saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *saved = Some(transcript.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory (not persisted)".to_string()
    }
}

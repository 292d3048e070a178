use chrono::{ DateTime, Local };
use log::info;
use std::path::PathBuf;
use tokio::fs;

use super::HistoryError;
use crate::models::chat::Transcript;

/// Role-labelled plain text, one paragraph per message.
pub fn render_plain_text(transcript: &Transcript) -> String {
    transcript
        .messages()
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("chat_{}.txt", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Write-only text exports; nothing in the program reads them back.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns `None` for an empty transcript.
    pub async fn write(
        &self,
        transcript: &Transcript,
        now: DateTime<Local>
    ) -> Result<Option<PathBuf>, HistoryError> {
        if transcript.is_empty() {
            return Ok(None);
        }
        fs::create_dir_all(&self.dir).await.map_err(|source| HistoryError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(export_file_name(now));
        fs::write(&path, render_plain_text(transcript)).await.map_err(|source| HistoryError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Exported {} messages to {}", transcript.len(), path.display());
        Ok(Some(path))
    }
}

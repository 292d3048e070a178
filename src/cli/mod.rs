use clap::{ Parser, Subcommand };
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::llm::{ LlmConfig, LlmType, DEFAULT_TEMPERATURE };
use crate::models::mode::Mode;

/// Environment variable consulted when `CHAT_API_KEY` / `--chat-api-key` is not set.
pub const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Constantine AI Assistant: decisions, advice and ideas in your terminal", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai", global = true)]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., https://api.openai.com/v1, http://localhost:11434)
    #[arg(long, env = "CHAT_BASE_URL", global = true)] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. Falls back to OPENAI_API_KEY.
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gpt-4o, llama3)
    #[arg(long, env = "CHAT_MODEL", global = true)] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Seconds before an unanswered completion request is abandoned.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "120", global = true)]
    pub request_timeout_secs: u64,

    // --- Transcript Args ---
    /// Path of the JSON file holding the conversation between runs.
    #[arg(long, env = "MEMORY_FILE", default_value = "chat_memory.json", global = true)]
    pub memory_file: PathBuf,

    /// Keep the conversation in memory only; nothing is read from or written to disk.
    #[arg(long, env = "NO_PERSIST", default_value = "false", global = true)]
    pub no_persist: bool,

    /// Write a plain-text export (chat_<timestamp>.txt) into this directory after every turn.
    #[arg(long, env = "EXPORT_DIR", global = true)]
    pub export_dir: Option<PathBuf>,

    // --- Prompt Args ---
    /// Optional JSON file overriding the persona and mode templates.
    #[arg(long, env = "PROMPTS_PATH", global = true)]
    pub prompts_path: Option<PathBuf>,

    /// Number of earlier messages quoted in each prompt (0 = every turn stands alone).
    #[arg(long, env = "HISTORY_TURNS", default_value = "0", global = true)]
    pub history_turns: usize,

    /// Starting mode (auto, decision, advice, creative, chat)
    #[arg(long, env = "ASSISTANT_MODE", default_value = "auto", global = true)]
    pub mode: Mode,

    // --- Display Args ---
    /// Do not prefix reply lines with decorative symbols.
    #[arg(long, env = "NO_DECORATE", default_value = "false", global = true)]
    pub no_decorate: bool,

    /// Delay per character when printing replies, in milliseconds (0 disables the typewriter effect).
    #[arg(long, env = "TYPEWRITER_MS", default_value = "0", global = true)]
    pub typewriter_ms: u64,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive chat (the default when no subcommand is given).
    Chat,
    /// Send one message, print the reply and store the turn.
    Ask {
        /// The message; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Pick one option at random from a comma-separated list.
    Pick {
        /// e.g. "pizza, burger, tacos"
        options: String,
    },
    /// Suggest a random dilemma to think about.
    Dilemma,
    /// Print the stored conversation.
    History,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidProvider(String),
    #[error(
        "Chat API key is required for provider '{provider}': set CHAT_API_KEY or OPENAI_API_KEY, or pass --chat-api-key"
    )]
    MissingApiKey {
        provider: LlmType,
    },
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    pub fn llm_type(&self) -> Result<LlmType, ConfigError> {
        self.chat_llm_type
            .parse::<LlmType>()
            .map_err(|e| ConfigError::InvalidProvider(e.to_string()))
    }

    /// Validates provider settings up front so a missing key stops the process before any I/O.
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        self.llm_config_with(std::env::var(FALLBACK_API_KEY_ENV).ok())
    }

    /// Same as `llm_config`, with the fallback key supplied by the caller.
    pub fn llm_config_with(&self, fallback_key: Option<String>) -> Result<LlmConfig, ConfigError> {
        let llm_type = self.llm_type()?;
        let api_key = resolve_api_key(&self.chat_api_key, fallback_key);
        if llm_type.requires_api_key() && api_key.is_none() {
            return Err(ConfigError::MissingApiKey { provider: llm_type });
        }
        Ok(LlmConfig {
            llm_type,
            api_key,
            completion_model: self.chat_model.clone(),
            base_url: self.chat_base_url.clone(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        })
    }

    pub fn memory_path(&self) -> Option<PathBuf> {
        if self.no_persist {
            None
        } else {
            Some(self.memory_file.clone())
        }
    }
}

fn resolve_api_key(explicit: &str, fallback: Option<String>) -> Option<String> {
    let explicit = explicit.trim();
    if !explicit.is_empty() {
        return Some(explicit.to_string());
    }
    fallback.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

use chrono::{ DateTime, Local };
use log::{ debug, error, info, warn };
use rand::{ RngCore, SeedableRng };
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::config::prompt::PromptConfig;
use crate::decorate::decorate_with;
use crate::history::export::ExportWriter;
use crate::history::{ HistoryError, TranscriptStore };
use crate::llm::chat::ChatClient;
use crate::llm::LlmError;
use crate::models::chat::{ ChatMessage, Transcript };
use crate::models::mode::Mode;

pub const ERROR_MARKER: &str = "❌ Error:";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("message is empty")]
    EmptyInput,
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingInput,
    Composing,
    AwaitingCompletion,
    Decorating,
    Persisting,
}

#[derive(Debug, Clone)]
pub struct TurnReply {
    /// Display-ready assistant text, already stored in the transcript.
    pub content: String,
    pub failed: bool,
    pub persist_error: Option<String>,
    pub export_path: Option<PathBuf>,
    pub export_error: Option<String>,
}

pub struct AssistantOptions {
    pub decorate: bool,
    pub export: Option<ExportWriter>,
    pub rng: Box<dyn RngCore + Send>,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            decorate: true,
            export: None,
            rng: Box::new(rand::rngs::StdRng::from_entropy()),
        }
    }
}

pub fn render_failure(err: &LlmError) -> String {
    format!("{} {}", ERROR_MARKER, err)
}

/// Runs one completion and never fails: errors come back as a marked message.
pub async fn complete_or_error(client: &dyn ChatClient, prompt: &str) -> String {
    match client.complete(prompt).await {
        Ok(resp) => resp.response,
        Err(e) => render_failure(&e),
    }
}

/// One chat session: owns the transcript and runs turns strictly one at a time.
pub struct Assistant {
    chat_client: Arc<dyn ChatClient>,
    store: Arc<dyn TranscriptStore>,
    prompt_config: PromptConfig,
    transcript: Transcript,
    state: TurnState,
    options: AssistantOptions,
}

impl Assistant {
    pub async fn start(
        chat_client: Arc<dyn ChatClient>,
        store: Arc<dyn TranscriptStore>,
        prompt_config: PromptConfig,
        options: AssistantOptions
    ) -> Result<Self, AgentError> {
        let transcript = store.load().await?;
        info!("Session started with {} stored messages ({})", transcript.len(), store.describe());
        Ok(Self {
            chat_client,
            store,
            prompt_config,
            transcript,
            state: TurnState::AwaitingInput,
            options,
        })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    fn transition(&mut self, next: TurnState) {
        debug!("turn state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub async fn handle_turn(&mut self, mode: Mode, user_text: &str) -> Result<TurnReply, AgentError> {
        if user_text.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }

        self.transition(TurnState::Composing);
        let prompt = self.prompt_config.compose(mode, user_text, &self.transcript);
        self.transcript.push(ChatMessage::user(user_text));
        debug!("mode={} template={:?} prompt_len={}", mode, mode.resolve(user_text), prompt.len());

        self.transition(TurnState::AwaitingCompletion);
        let outcome = self.chat_client.complete(&prompt).await;

        self.transition(TurnState::Decorating);
        let (content, failed) = match outcome {
            Ok(resp) if self.options.decorate => {
                (decorate_with(&resp.response, &mut *self.options.rng), false)
            }
            Ok(resp) => (resp.response, false),
            Err(e) => {
                warn!("Completion failed ({}): {}", e.kind(), e);
                (render_failure(&e), true)
            }
        };
        self.transcript.push(ChatMessage::assistant(content.clone()));

        self.transition(TurnState::Persisting);
        let persist_error = match self.store.save(&self.transcript).await {
            Ok(()) => None,
            Err(e) => {
                error!("Failed to persist transcript, continuing in memory: {}", e);
                Some(e.to_string())
            }
        };
        let (export_path, export_error) = match &self.options.export {
            Some(writer) =>
                match writer.write(&self.transcript, Local::now()).await {
                    Ok(path) => (path, None),
                    Err(e) => {
                        error!("Failed to write export: {}", e);
                        (None, Some(e.to_string()))
                    }
                }
            None => (None, None),
        };

        self.transition(TurnState::AwaitingInput);
        Ok(TurnReply { content, failed, persist_error, export_path, export_error })
    }

    /// On-demand export, independent of the per-turn export setting.
    pub async fn export(
        &self,
        writer: &ExportWriter,
        now: DateTime<Local>
    ) -> Result<Option<PathBuf>, AgentError> {
        Ok(writer.write(&self.transcript, now).await?)
    }

    pub fn shutdown(mut self) -> Transcript {
        self.transition(TurnState::Idle);
        info!("Session ended with {} messages", self.transcript.len());
        self.transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;
    use crate::llm::chat::CompletionResponse;
    use crate::models::chat::Role;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    struct EchoClient {
        prompts: Mutex<Vec<String>>,
    }

    impl EchoClient {
        fn new() -> Self {
            Self { prompts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ChatClient for EchoClient {
        async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(CompletionResponse { response: "Line one\n\nLine two".to_string() })
        }

        fn get_model(&self) -> String {
            "echo".to_string()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    struct FailingClient;

    #[async_trait]
    impl ChatClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::Status { status: 401, body: "invalid api key".to_string() })
        }

        fn get_model(&self) -> String {
            "failing".to_string()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    fn seeded_options(decorate: bool) -> AssistantOptions {
        AssistantOptions {
            decorate,
            export: None,
            rng: Box::new(StdRng::seed_from_u64(42)),
        }
    }

    #[tokio::test]
    async fn complete_or_error_marks_failures() {
        let text = complete_or_error(&FailingClient, "hi").await;
        assert!(text.starts_with(ERROR_MARKER));
        assert!(text.contains("invalid api key"));
    }

    #[tokio::test]
    async fn turn_appends_user_then_assistant_and_persists() {
        let store = Arc::new(MemoryStore::default());
        let client = Arc::new(EchoClient::new());
        let mut assistant = Assistant::start(
            client.clone(),
            store.clone(),
            PromptConfig::default(),
            seeded_options(false)
        ).await.unwrap();

        let reply = assistant.handle_turn(Mode::DecisionHelper, "Pizza or burger?").await.unwrap();
        assert!(!reply.failed);
        assert_eq!(reply.content, "Line one\n\nLine two");
        assert!(reply.persist_error.is_none());

        let messages = assistant.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Pizza or burger?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(store.load().await.unwrap(), *assistant.transcript());

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("final verdict"));
        assert!(prompts[0].contains("Pizza or burger?"));
        assert_eq!(assistant.state(), TurnState::AwaitingInput);
    }

    #[tokio::test]
    async fn decoration_prefixes_non_blank_lines() {
        let mut assistant = Assistant::start(
            Arc::new(EchoClient::new()),
            Arc::new(MemoryStore::default()),
            PromptConfig::default(),
            seeded_options(true)
        ).await.unwrap();

        let reply = assistant.handle_turn(Mode::GeneralChat, "hello").await.unwrap();
        let lines: Vec<&str> = reply.content.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" Line one"));
        assert_eq!(lines[1], "");
        assert!(lines[2].ends_with(" Line two"));
    }

    #[tokio::test]
    async fn failed_completion_still_yields_a_reply() {
        let store = Arc::new(MemoryStore::default());
        let mut assistant = Assistant::start(
            Arc::new(FailingClient),
            store.clone(),
            PromptConfig::default(),
            seeded_options(true)
        ).await.unwrap();

        let reply = assistant.handle_turn(Mode::AutoDetect, "Should I?").await.unwrap();
        assert!(reply.failed);
        assert!(reply.content.starts_with(ERROR_MARKER));
        assert_eq!(assistant.transcript().len(), 2);
        assert_eq!(store.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_input_is_rejected_without_touching_transcript() {
        let mut assistant = Assistant::start(
            Arc::new(EchoClient::new()),
            Arc::new(MemoryStore::default()),
            PromptConfig::default(),
            seeded_options(false)
        ).await.unwrap();

        assert!(matches!(assistant.handle_turn(Mode::GeneralChat, "   ").await, Err(AgentError::EmptyInput)));
        assert!(assistant.transcript().is_empty());
    }

    #[tokio::test]
    async fn resumes_from_stored_transcript() {
        let mut previous = Transcript::new();
        previous.push(ChatMessage::user("old question"));
        previous.push(ChatMessage::assistant("old answer"));
        let store = Arc::new(MemoryStore::with_transcript(previous));

        let mut assistant = Assistant::start(
            Arc::new(EchoClient::new()),
            store,
            PromptConfig::default(),
            seeded_options(false)
        ).await.unwrap();
        assistant.handle_turn(Mode::GeneralChat, "new question").await.unwrap();

        let transcript = assistant.shutdown();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.messages()[0].content, "old question");
        assert_eq!(transcript.messages()[2].content, "new question");
    }

    #[tokio::test]
    async fn history_turns_feed_earlier_messages_into_prompt() {
        let client = Arc::new(EchoClient::new());
        let mut assistant = Assistant::start(
            client.clone(),
            Arc::new(MemoryStore::default()),
            PromptConfig::default().with_history_turns(4),
            seeded_options(false)
        ).await.unwrap();

        assistant.handle_turn(Mode::GeneralChat, "first").await.unwrap();
        assistant.handle_turn(Mode::GeneralChat, "second").await.unwrap();

        let prompts = client.prompts.lock().unwrap();
        assert!(!prompts[0].contains("Previous conversation:"));
        assert!(prompts[1].contains("Previous conversation:\nUser: first\n"));
        assert!(!prompts[1].contains("User: second\n"));
    }
}

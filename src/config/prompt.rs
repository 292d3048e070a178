use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

use crate::models::chat::{ ChatMessage, Role, Transcript };
use crate::models::mode::{ Mode, TemplateKind };

pub const USER_INPUT_PLACEHOLDER: &str = "{user_input}";

pub const DEFAULT_PERSONA: &str =
    "You are Constantine AI Assistant — smart, friendly, and creative. You help users make decisions, give advice, and explore ideas.
You always consider:
- Human psychology (e.g., indecision, pros/cons, emotions)
- Common sense reasoning
- Popular culture references
- Motivational and encouraging tone
- Current knowledge from 2024";

pub const DECISION_HELPER_TEMPLATE: &str =
    "You are Constantine AI Assistant, a decision-making guide. Help the user choose.\nUser said: '{user_input}'. Give pros/cons, suggestions, and a final verdict.";

pub const ADVICE_GIVER_TEMPLATE: &str =
    "You are Constantine AI Assistant, a wise and friendly advisor.\nUser said: '{user_input}'. Offer helpful suggestions and reasoning.";

pub const CREATIVE_IDEAS_TEMPLATE: &str =
    "You are Constantine AI Assistant, a creative brainstorming partner.\nUser input: '{user_input}'. Return 3–5 fun, useful, or clever ideas.";

pub const GENERAL_CHAT_TEMPLATE: &str =
    "You are Constantine AI Assistant. The user says: '{user_input}'. Respond with helpful or friendly conversation.";

pub const QUESTION_TEMPLATE: &str =
    "You are Constantine AI Assistant. The user has a question or decision to make.\nUser said: '{user_input}'. Answer with logic, clarity, and friendliness.";

pub const OPEN_ENDED_TEMPLATE: &str =
    "User said: '{user_input}'. Respond with something smart, friendly, or helpful.";

fn builtin_template(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::DecisionHelper => DECISION_HELPER_TEMPLATE,
        TemplateKind::AdviceGiver => ADVICE_GIVER_TEMPLATE,
        TemplateKind::CreativeIdeas => CREATIVE_IDEAS_TEMPLATE,
        TemplateKind::GeneralChat => GENERAL_CHAT_TEMPLATE,
        TemplateKind::Question => QUESTION_TEMPLATE,
        TemplateKind::OpenEnded => OPEN_ENDED_TEMPLATE,
    }
}

#[derive(Debug)]
pub enum PromptError {
    TemplateNotFound(String),
    MissingPlaceholder(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::TemplateNotFound(key) => write!(f, "Prompt template '{}' not found", key),
            PromptError::MissingPlaceholder(key) =>
                write!(f, "Prompt template '{}' does not contain {}", key, USER_INPUT_PLACEHOLDER),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// Shape of a prompts file. Every field is optional; missing entries keep the built-in text.
#[derive(Deserialize, Debug, Default)]
struct PromptOverrides {
    #[serde(default)]
    persona: Option<String>,
    #[serde(default)]
    templates: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub persona: String,
    templates: HashMap<&'static str, String>,
    /// Number of earlier messages quoted ahead of the task. Zero keeps every turn independent.
    pub history_turns: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let templates = TemplateKind::ALL
            .iter()
            .map(|kind| (kind.key(), builtin_template(*kind).to_string()))
            .collect();
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            templates,
            history_turns: 0,
        }
    }
}

impl PromptConfig {
    pub fn with_history_turns(mut self, history_turns: usize) -> Self {
        self.history_turns = history_turns;
        self
    }

    pub fn template(&self, kind: TemplateKind) -> &str {
        self.templates
            .get(kind.key())
            .map(|s| s.as_str())
            .unwrap_or_else(|| builtin_template(kind))
    }

    fn apply(&mut self, overrides: PromptOverrides) -> Result<(), PromptError> {
        if let Some(persona) = overrides.persona {
            self.persona = persona;
        }
        for (key, template) in overrides.templates {
            let kind = TemplateKind::ALL
                .iter()
                .copied()
                .find(|kind| kind.key() == key)
                .ok_or_else(|| PromptError::TemplateNotFound(format!("templates:{}", key)))?;
            if !template.contains(USER_INPUT_PLACEHOLDER) {
                return Err(PromptError::MissingPlaceholder(key));
            }
            self.templates.insert(kind.key(), template);
        }
        Ok(())
    }

    /// Builds the prompt for one turn. `history` holds the messages before this turn.
    pub fn compose(&self, mode: Mode, user_text: &str, history: &Transcript) -> String {
        let task = self.template(mode.resolve(user_text)).replace(USER_INPUT_PLACEHOLDER, user_text);

        let mut prompt = self.persona.clone();
        prompt.push_str("\n\n");
        if self.history_turns > 0 {
            let context = format_history_for_prompt(history.recent(self.history_turns));
            if !context.is_empty() {
                prompt.push_str(&context);
                prompt.push('\n');
            }
        }
        prompt.push_str(&task);
        prompt
    }
}

/// Composes with the built-in persona and templates.
pub fn compose(mode: Mode, user_text: &str, history: &Transcript) -> String {
    PromptConfig::default().compose(mode, user_text, history)
}

pub fn format_history_for_prompt(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let mut result = String::from("Previous conversation:\n");
    for msg in messages {
        let role_display = match msg.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        result.push_str(&format!("{}: {}\n", role_display, msg.content));
    }
    result
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<PromptConfig, PromptError> {
    let path = path.as_ref();
    let file_content = fs::read_to_string(path)?;
    let overrides: PromptOverrides = serde_json::from_str(&file_content)?;
    let mut config = PromptConfig::default();
    config.apply(overrides)?;
    info!("Loaded prompt overrides from: {}", path.display());
    Ok(config)
}

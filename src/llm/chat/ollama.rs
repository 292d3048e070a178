use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use reqwest::header::HeaderMap;
use serde::{ Deserialize, Serialize };

use super::{ build_http_client, check_status, non_empty, ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmError, LlmType };

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.llm_type != LlmType::Ollama {
            return Err(LlmError::Config("Invalid config type for OllamaClient".to_string()));
        }

        let model = config.completion_model
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        let url = config.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http: build_http_client(HeaderMap::new(), config.request_timeout)?,
            base_url: url,
            completion_model: model,
            temperature: config.temperature,
        })
    }

    fn generate_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.completion_model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions { temperature: self.temperature },
        }
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!("POST {} (model={})", url, self.completion_model);

        let resp = self.http.post(&url).json(&self.generate_request(prompt)).send().await?;
        let data = check_status(resp).await?.json::<GenerateResponse>().await?;
        non_empty(&data.response)
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

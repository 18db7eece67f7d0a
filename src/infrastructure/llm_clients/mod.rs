pub mod gemini;
pub mod openai;

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::llm_config::LLMProvider;
use async_trait::async_trait;
use gemini::GeminiClient;
use openai::OpenAIClient;

#[async_trait]
pub trait LLMClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;
    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>>;
}

pub struct RouterClient {
    openai: OpenAIClient,
    gemini: GeminiClient,
}

impl RouterClient {
    pub fn new() -> Self {
        Self {
            openai: OpenAIClient::new(),
            gemini: GeminiClient::new(),
        }
    }
}

impl Default for RouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for RouterClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        match config.provider {
            LLMProvider::Google => self.gemini.generate(config, system, user).await,
            LLMProvider::OpenAI | LLMProvider::Local => {
                self.openai.generate(config, system, user).await
            }
        }
    }

    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>> {
        match config.provider {
            LLMProvider::Google => self.gemini.list_models(config).await,
            LLMProvider::OpenAI | LLMProvider::Local => self.openai.list_models(config).await,
        }
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Turn a non-2xx response into an `LLMError` carrying status and body
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    tracing::warn!(%status, "LLM provider returned an error");
    Err(AppError::LLMError(format!("API error ({}): {}", status, text)))
}

use super::{ensure_success, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiModelsResponse {
    models: Option<Vec<GeminiModelInfo>>,
}

#[derive(Deserialize)]
struct GeminiModelInfo {
    name: String,
}

/// Google Generative Language API client
pub struct GeminiClient {
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<&str> {
        config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::LLMError("API key not set. Please configure it in Settings.".to_string())
            })
    }

    fn build_request(config: &LLMConfig, system: &str, user: &str) -> GeminiRequest {
        let system_instruction = (!system.trim().is_empty()).then(|| GeminiContent {
            parts: vec![GeminiPart {
                text: system.to_string(),
            }],
            role: None,
        });

        GeminiRequest {
            system_instruction,
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: user.to_string(),
                }],
                role: Some("user"),
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature.unwrap_or(0.7),
                max_output_tokens: config.max_tokens,
            },
        }
    }

    /// Text of the first candidate, all parts concatenated
    fn extract_text(response: GeminiResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMError("Model returned no candidates".to_string()))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(AppError::LLMError("Invalid response format".to_string()));
        }
        Ok(text)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let base_url = config.base_url.trim_end_matches('/');
        let url = format!("{}/{}:generateContent", base_url, config.model.trim());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::build_request(config, system, user))
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;
        let response = ensure_success(response).await?;

        let json: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        Self::extract_text(json)
    }

    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>> {
        let api_key = Self::api_key(config)?;
        let url = config.base_url.trim_end_matches('/').to_string();

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;
        let response = ensure_success(response).await?;

        let json: GeminiModelsResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        Ok(json
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|model| {
                model
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(model.name.as_str())
                    .to_string()
            })
            .collect())
    }
}

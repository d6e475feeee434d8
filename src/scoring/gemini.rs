//! Generative Language API (Gemini / Gemma) scoring client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::model::{ModelVerdict, ScoreError, ScoringModel};
use super::verdict::{ScoreRange, parse_verdict};
use crate::config::ScoringConfig;
use crate::error::{CuratrError, Result};

/// Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model to use
const DEFAULT_MODEL: &str = "gemma-3-27b-it";

/// Default max output tokens
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200;

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub timeout: Duration,
    pub range: ScoreRange,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: Duration::from_secs(60),
            range: ScoreRange::default(),
        }
    }
}

impl From<&ScoringConfig> for GeminiConfig {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            timeout: Duration::from_millis(config.timeout_ms),
            range: ScoreRange::new(config.min_score, config.max_score),
        }
    }
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client, reading the API key from `api_key_env`
    pub fn from_env(api_key_env: &str, config: GeminiConfig) -> Result<Self> {
        let api_key =
            std::env::var(api_key_env).map_err(|_| CuratrError::Config(format!("{} not set", api_key_env)))?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CuratrError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the request body for generateContent
    fn build_request(&self, text: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": text }]
            }],
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens
            }
        })
    }

    /// Concatenate the text parts of the first candidate
    fn extract_text(body: &Value) -> std::result::Result<String, ScoreError> {
        let parts = body["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| ScoreError::MalformedResponse("response has no candidate parts".to_string()))?;

        let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if text.trim().is_empty() {
            return Err(ScoreError::MalformedResponse("response text is empty".to_string()));
        }
        Ok(text)
    }

    /// Send a request to the API
    async fn send_request(&self, body: Value) -> std::result::Result<Value, ScoreError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoreError::Unavailable(format!("Request failed: {}", e)))?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScoreError::Unavailable(format!(
                "Rate limited, retry after {} seconds",
                retry_after
            )));
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScoreError::Unavailable(format!("API error {}: {}", status, error_body)));
        }

        response
            .json()
            .await
            .map_err(|e| ScoreError::MalformedResponse(format!("Failed to parse response body: {}", e)))
    }
}

#[async_trait]
impl ScoringModel for GeminiClient {
    async fn score(&self, text: &str) -> std::result::Result<ModelVerdict, ScoreError> {
        let body = self.build_request(text);
        let response = self.send_request(body).await?;
        let reply = Self::extract_text(&response)?;
        parse_verdict(&reply, self.config.range)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("max_output_tokens", &self.config.max_output_tokens)
            .finish()
    }
}

// ABOUTME: Chat-completions client for OpenAI-compatible APIs (OpenAI, Groq)
// ABOUTME: One implementation parameterized on base URL, key and model priority list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # `OpenAI`-Compatible Provider
//!
//! `OpenAI` and Groq speak the same `chat/completions` wire format, so one
//! client serves both; the constructors differ only in base URL, display
//! name and model priority list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{GenerationError, RecipeProvider};
use crate::errors::AppError;

/// Request timeout for cloud completions
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `OpenAI` API endpoint
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Groq endpoint (`OpenAI`-compatible)
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// `OpenAI` models in priority order
const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o", "gpt-3.5-turbo"];

/// Groq models in priority order
const GROQ_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "gemma2-9b-it",
];

/// Chat completions request (`OpenAI` wire format)
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for any `chat/completions`-shaped API
pub struct OpenAiCompatibleProvider {
    client: Client,
    name: &'static str,
    base_url: String,
    api_key: String,
    models: Vec<String>,
}

impl OpenAiCompatibleProvider {
    /// Create a provider against the `OpenAI` API
    pub fn openai(api_key: String) -> Self {
        Self::custom("openai", OPENAI_BASE_URL, api_key, OPENAI_MODELS)
    }

    /// Create a provider against the Groq API
    pub fn groq(api_key: String) -> Self {
        Self::custom("groq", GROQ_BASE_URL, api_key, GROQ_MODELS)
    }

    fn custom(name: &'static str, base_url: &str, api_key: String, models: &[&str]) -> Self {
        Self {
            client: Client::new(),
            name,
            base_url: base_url.to_owned(),
            api_key,
            models: models.iter().map(|m| (*m).to_owned()).collect(),
        }
    }
}

#[async_trait]
impl RecipeProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        debug!(provider = self.name, model, "sending chat completion request");

        let request = CompletionRequest {
            model: model.to_owned(),
            messages: vec![WireMessage {
                role: "user",
                content: prompt.to_owned(),
            }],
            temperature: 0.7,
            max_tokens: 700,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.name, model, "request failed: {e}");
                AppError::external_service(self.name, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Failed(AppError::external_service(
                self.name,
                format!(
                    "API error ({status}): {}",
                    body.chars().take(200).collect::<String>()
                ),
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            AppError::external_service(self.name, format!("failed to parse response: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!(
            provider = self.name,
            model,
            chars = content.len(),
            "received completion"
        );

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_priority_order_is_fixed() {
        let provider = OpenAiCompatibleProvider::groq("key".to_owned());
        assert_eq!(provider.models()[0], "llama-3.3-70b-versatile");
        assert!(provider.requires_credential());

        let provider = OpenAiCompatibleProvider::openai("key".to_owned());
        assert_eq!(provider.models()[0], "gpt-4o-mini");
        assert_eq!(provider.name(), "openai");
    }
}

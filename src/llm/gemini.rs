// ABOUTME: Google Gemini text-generation provider
// ABOUTME: Calls the generateContent endpoint with an ordered model priority list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Gemini Provider
//!
//! Uses the Generative Language API `generateContent` endpoint. The API key
//! comes from configuration; rate-limit responses are classified separately
//! so the fallback chain can advance within the model list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{GenerationError, RecipeProvider};
use crate::errors::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL for the Generative Language API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini models in priority order
const GEMINI_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

const PROVIDER_NAME: &str = "gemini";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    models: Vec<String>,
}

impl GeminiProvider {
    /// Create a provider with the given API key
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            models: GEMINI_MODELS.iter().map(|m| (*m).to_owned()).collect(),
        }
    }
}

#[async_trait]
impl RecipeProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        debug!(model, "sending generateContent request to Gemini");

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_owned(),
                }],
            }],
        };

        let url = format!(
            "{API_BASE_URL}/models/{model}:generateContent?key={}",
            self.api_key
        );

        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(model, "Gemini request failed: {e}");
                AppError::external_service(PROVIDER_NAME, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Failed(AppError::external_service(
                PROVIDER_NAME,
                format!(
                    "API error ({status}): {}",
                    body.chars().take(200).collect::<String>()
                ),
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            AppError::external_service(PROVIDER_NAME, format!("failed to parse response: {e}"))
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        debug!(model, chars = text.len(), "received Gemini completion");
        Ok(text)
    }
}

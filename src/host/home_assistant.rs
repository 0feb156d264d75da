// ABOUTME: Home Assistant REST API client implementing the host integration traits
// ABOUTME: Covers entity states, notifications, the shopping list and the conversation agent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Home Assistant Client
//!
//! One authenticated `reqwest` client for every host capability the tracker
//! consumes:
//!
//! - `POST /api/states/{entity_id}` for sensor publication
//! - `GET /api/states/{entity_id}` for meter and price reads
//! - `POST /api/services/persistent_notification/create` and
//!   `POST /api/services/notify/{service}` for notifications
//! - `GET /api/shopping_list` plus the `shopping_list.*` services
//! - `POST /api/conversation/process` for host-managed text generation
//!
//! All failures surface as [`AppError`]; callers decide which fallback or
//! user message applies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{ConversationAgent, HostStates, Notifier, ShoppingList};
use crate::errors::{AppError, AppResult};
use crate::models::ShoppingListEntry;

/// Timeout for state and service calls
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for conversation-agent calls, which can run a local model
const CONVERSATION_TIMEOUT: Duration = Duration::from_secs(15);

const SERVICE_NAME: &str = "Home Assistant";

/// Entity state payload returned by `GET /api/states/{entity_id}`
#[derive(Debug, Deserialize)]
struct StateResponse {
    state: String,
}

/// Reply shape of `POST /api/conversation/process`
#[derive(Debug, Deserialize)]
struct ConversationResponse {
    response: ConversationSpeechWrapper,
}

#[derive(Debug, Deserialize)]
struct ConversationSpeechWrapper {
    speech: ConversationSpeech,
}

#[derive(Debug, Deserialize)]
struct ConversationSpeech {
    plain: ConversationPlain,
}

#[derive(Debug, Deserialize)]
struct ConversationPlain {
    speech: String,
}

/// Authenticated Home Assistant REST client
pub struct HomeAssistantClient {
    client: Client,
    base_url: Url,
    token: String,
    notify_service: String,
}

impl HomeAssistantClient {
    /// Create a client for the given base URL and long-lived access token.
    ///
    /// `notify_service` is the service name under the `notify` domain used
    /// for push notifications (e.g. `notify` or `mobile_app_phone`).
    pub fn new(base_url: &str, token: &str, notify_service: &str) -> AppResult<Self> {
        // A trailing slash keeps Url::join from replacing the last path
        // segment (e.g. the `/core` of the supervisor proxy URL).
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| AppError::config(format!("invalid Home Assistant URL: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            token: token.to_owned(),
            notify_service: notify_service.to_owned(),
        })
    }

    fn api_url(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::internal(format!("bad API path {path}: {e}")))
    }

    async fn post_json(&self, path: &str, body: Value, timeout: Duration) -> AppResult<Value> {
        let url = self.api_url(path)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("{path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("{path} returned {status}: {}", truncate(&body, 200)),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("{path}: {e}")))
    }

    /// Call a service in the given domain, discarding the response body.
    async fn call_service(&self, domain: &str, service: &str, data: Value) -> AppResult<()> {
        let path = format!("api/services/{domain}/{service}");
        self.post_json(&path, data, API_TIMEOUT).await.map(|_| ())
    }
}

/// Interpret a raw entity state as a number; `unknown`/`unavailable` and
/// other non-numeric states become `None`.
fn parse_numeric_state(state: &str) -> Option<f64> {
    state.trim().parse::<f64>().ok()
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[async_trait]
impl HostStates for HomeAssistantClient {
    async fn set_state(&self, entity_id: &str, state: &str, attributes: Value) -> AppResult<()> {
        let path = format!("api/states/{entity_id}");
        debug!(entity_id, state, "publishing entity state");
        self.post_json(
            &path,
            json!({ "state": state, "attributes": attributes }),
            API_TIMEOUT,
        )
        .await
        .map(|_| ())
    }

    async fn numeric_state(&self, entity_id: &str) -> AppResult<Option<f64>> {
        let url = self.api_url(&format!("api/states/{entity_id}"))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("{entity_id}: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("{entity_id} returned {status}"),
            ));
        }

        let state: StateResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("{entity_id}: {e}")))?;

        Ok(parse_numeric_state(&state.state))
    }
}

#[async_trait]
impl Notifier for HomeAssistantClient {
    async fn persistent(
        &self,
        title: &str,
        message: &str,
        notification_id: &str,
    ) -> AppResult<()> {
        self.call_service(
            "persistent_notification",
            "create",
            json!({
                "title": title,
                "message": message,
                "notification_id": notification_id,
            }),
        )
        .await
    }

    async fn push(&self, title: &str, message: &str) -> AppResult<()> {
        self.call_service(
            "notify",
            &self.notify_service,
            json!({ "title": title, "message": message }),
        )
        .await
    }
}

#[async_trait]
impl ShoppingList for HomeAssistantClient {
    async fn entries(&self) -> AppResult<Vec<ShoppingListEntry>> {
        let url = self.api_url("api/shopping_list")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("shopping_list: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("shopping_list returned {status}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, format!("shopping_list: {e}")))
    }

    async fn add_item(&self, name: &str) -> AppResult<()> {
        self.call_service("shopping_list", "add_item", json!({ "name": name }))
            .await
    }

    async fn remove_item(&self, name: &str) -> AppResult<()> {
        self.call_service("shopping_list", "remove_item", json!({ "name": name }))
            .await
    }
}

#[async_trait]
impl ConversationAgent for HomeAssistantClient {
    async fn converse(&self, text: &str) -> AppResult<String> {
        let reply: ConversationResponse = serde_json::from_value(
            self.post_json(
                "api/conversation/process",
                json!({ "text": text }),
                CONVERSATION_TIMEOUT,
            )
            .await?,
        )
        .map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("conversation reply: {e}"))
        })?;

        Ok(reply.response.speech.plain.speech)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_state() {
        assert_eq!(parse_numeric_state("12.5"), Some(12.5));
        assert_eq!(parse_numeric_state(" 3 "), Some(3.0));
        assert_eq!(parse_numeric_state("unknown"), None);
        assert_eq!(parse_numeric_state("unavailable"), None);
        assert_eq!(parse_numeric_state(""), None);
    }

    #[test]
    fn test_conversation_reply_shape() {
        let raw = serde_json::json!({
            "response": { "speech": { "plain": { "speech": "Pannkakor!" } } },
            "conversation_id": null,
        });
        let parsed: ConversationResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.response.speech.plain.speech, "Pannkakor!");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HomeAssistantClient::new("not a url", "token", "notify").is_err());
    }
}

// ABOUTME: Recipe provider backed by the host's conversation agent
// ABOUTME: Credential-free fallback target when a cloud provider has no API key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Host Agent Provider
//!
//! Wraps the host conversation API as a [`RecipeProvider`]. It requires no
//! external credential, which makes it the cascade target when the
//! configured cloud provider is missing its API key. There is exactly one
//! "model": the host's configured agent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{GenerationError, RecipeProvider};
use crate::host::ConversationAgent;

/// Pseudo-model name reported for the host agent
const AGENT_MODEL: &str = "conversation";

/// Provider delegating to the host conversation agent
pub struct HostAgentProvider {
    agent: Arc<dyn ConversationAgent>,
    models: Vec<String>,
}

impl HostAgentProvider {
    /// Wrap a conversation agent
    pub fn new(agent: Arc<dyn ConversationAgent>) -> Self {
        Self {
            agent,
            models: vec![AGENT_MODEL.to_owned()],
        }
    }
}

#[async_trait]
impl RecipeProvider for HostAgentProvider {
    fn name(&self) -> &'static str {
        "host_agent"
    }

    fn requires_credential(&self) -> bool {
        false
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
        debug!("sending prompt to host conversation agent");
        let reply = self.agent.converse(prompt).await?;
        Ok(reply)
    }
}

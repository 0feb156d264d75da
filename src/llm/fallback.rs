// ABOUTME: Ordered provider/model fallback chain for recipe generation
// ABOUTME: Implements credential cascade, per-model rate-limit advancement and exhaustion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Provider Fallback Chain
//!
//! One invocation resolves to a terminal outcome:
//!
//! 1. The configured (or explicitly overridden) provider kind is resolved.
//! 2. `disabled` with no override terminates as [`ChainOutcome::NotConfigured`]
//!    — a user-facing signal, not an error.
//! 3. A provider that requires a credential but has none configured cascades
//!    to the host agent. This is the only case that switches providers.
//! 4. The chosen provider's models are attempted in priority order. A
//!    rate-limited response advances to the next model; any other failure is
//!    logged as that model's failure (no retry of the same model) and the
//!    loop advances as well. The first non-empty completion short-circuits.
//! 5. When the model list is exhausted the invocation ends as
//!    [`ChainOutcome::Exhausted`]; it never cascades to another provider.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{GenerationError, RecipeProvider, RecipeProviderKind};
use crate::config::TrackerConfig;
use crate::host::ConversationAgent;
use crate::llm::{GeminiProvider, HostAgentProvider, OpenAiCompatibleProvider};

/// Terminal state of one chain invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// A model produced non-empty text
    Success {
        /// Provider that answered
        provider: &'static str,
        /// Model that answered
        model: String,
        /// Raw generated text (energy annotation still attached)
        text: String,
    },
    /// Recipe generation is disabled and no override was given
    NotConfigured,
    /// Every model of the chosen provider failed
    Exhausted,
}

/// Ordered fallback chain over the configured providers
pub struct FallbackChain {
    configured: RecipeProviderKind,
    openai: Option<Arc<dyn RecipeProvider>>,
    groq: Option<Arc<dyn RecipeProvider>>,
    gemini: Option<Arc<dyn RecipeProvider>>,
    host_agent: Arc<dyn RecipeProvider>,
}

impl FallbackChain {
    /// Build a chain with explicit providers. Cloud providers are `None`
    /// when their credential is not configured.
    pub fn new(
        configured: RecipeProviderKind,
        openai: Option<Arc<dyn RecipeProvider>>,
        groq: Option<Arc<dyn RecipeProvider>>,
        gemini: Option<Arc<dyn RecipeProvider>>,
        host_agent: Arc<dyn RecipeProvider>,
    ) -> Self {
        Self {
            configured,
            openai,
            groq,
            gemini,
            host_agent,
        }
    }

    /// Build the chain from configuration, constructing cloud providers for
    /// each configured API key and the host agent over the given
    /// conversation interface.
    pub fn from_config(config: &TrackerConfig, agent: Arc<dyn ConversationAgent>) -> Self {
        let openai = config.openai_api_key.clone().map(|key| {
            Arc::new(OpenAiCompatibleProvider::openai(key)) as Arc<dyn RecipeProvider>
        });
        let groq = config
            .groq_api_key
            .clone()
            .map(|key| Arc::new(OpenAiCompatibleProvider::groq(key)) as Arc<dyn RecipeProvider>);
        let gemini = config
            .gemini_api_key
            .clone()
            .map(|key| Arc::new(GeminiProvider::new(key)) as Arc<dyn RecipeProvider>);

        Self::new(
            config.recipe_provider,
            openai,
            groq,
            gemini,
            Arc::new(HostAgentProvider::new(agent)),
        )
    }

    /// The configured provider kind
    pub fn configured_kind(&self) -> RecipeProviderKind {
        self.configured
    }

    /// Resolve a kind to a concrete provider, cascading to the host agent
    /// when the kind's credential is missing.
    fn resolve(&self, kind: RecipeProviderKind) -> Option<Arc<dyn RecipeProvider>> {
        let configured = match kind {
            RecipeProviderKind::Disabled => return None,
            RecipeProviderKind::Openai => self.openai.clone(),
            RecipeProviderKind::Groq => self.groq.clone(),
            RecipeProviderKind::Gemini => self.gemini.clone(),
            RecipeProviderKind::HostAgent => return Some(self.host_agent.clone()),
        };

        Some(configured.unwrap_or_else(|| {
            info!(provider = %kind, "no credential configured, using host agent instead");
            self.host_agent.clone()
        }))
    }

    /// Run one invocation of the chain.
    pub async fn generate(
        &self,
        prompt: &str,
        provider_override: Option<RecipeProviderKind>,
    ) -> ChainOutcome {
        let kind = provider_override.unwrap_or(self.configured);

        let Some(provider) = self.resolve(kind) else {
            debug!("recipe generation not configured");
            return ChainOutcome::NotConfigured;
        };

        for model in provider.models() {
            match provider.generate(model, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(provider = provider.name(), model = %model, "generation succeeded");
                    return ChainOutcome::Success {
                        provider: provider.name(),
                        model: model.clone(),
                        text,
                    };
                }
                Ok(_) => {
                    warn!(provider = provider.name(), model = %model, "empty completion");
                }
                Err(GenerationError::RateLimited) => {
                    debug!(
                        provider = provider.name(),
                        model = %model,
                        "rate limited, advancing to next model"
                    );
                }
                Err(GenerationError::Failed(e)) => {
                    warn!(provider = provider.name(), model = %model, "model failed: {e}");
                }
            }
        }

        warn!(provider = provider.name(), "all models exhausted");
        ChainOutcome::Exhausted
    }
}

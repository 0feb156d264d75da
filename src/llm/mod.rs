// ABOUTME: Text-generation provider abstraction for recipe suggestions
// ABOUTME: Defines the provider trait, provider kinds and generation error classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Recipe Generation Providers
//!
//! A closed set of text-generation providers produces recipe suggestions for
//! soon-to-expire items. Providers that expose several backing models list
//! them in fixed priority order; the fallback chain in [`fallback`] walks
//! that order. The host conversation agent is the one provider that needs no
//! external credential.

mod energy;
mod fallback;
mod gemini;
mod host_agent;
mod openai_compatible;

pub use energy::{extract_annotation, Appliance, EnergyEstimate};
pub use fallback::{ChainOutcome, FallbackChain};
pub use gemini::GeminiProvider;
pub use host_agent::HostAgentProvider;
pub use openai_compatible::OpenAiCompatibleProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::errors::AppError;

/// Configured provider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipeProviderKind {
    /// Recipe suggestions are turned off
    #[default]
    Disabled,
    /// `OpenAI` chat completions
    Openai,
    /// Groq (`OpenAI`-compatible API)
    Groq,
    /// Google Gemini
    Gemini,
    /// The host's own conversation agent; requires no external credential
    HostAgent,
}

impl RecipeProviderKind {
    /// Parse from a configuration string, falling back to `Disabled`
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "openai" => Self::Openai,
            "groq" => Self::Groq,
            "gemini" | "google" => Self::Gemini,
            "host_agent" | "host" | "conversation" => Self::HostAgent,
            _ => Self::Disabled,
        }
    }
}

impl fmt::Display for RecipeProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::Openai => "openai",
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::HostAgent => "host_agent",
        };
        f.write_str(s)
    }
}

/// Why one model attempt produced no text
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The upstream answered with a rate-limit response; the chain advances
    /// to the provider's next model
    #[error("rate limited")]
    RateLimited,
    /// Any other failure: non-2xx status, transport error or timeout
    #[error(transparent)]
    Failed(#[from] AppError),
}

/// A text-generation provider with an ordered model list
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Provider identifier for logs and sensor metadata
    fn name(&self) -> &'static str;

    /// Whether this provider needs an external API credential
    fn requires_credential(&self) -> bool;

    /// Backing models in fixed priority order
    fn models(&self) -> &[String];

    /// Run one generation attempt against one model.
    ///
    /// An `Ok` with empty text is treated by the chain as that model's
    /// failure; a successful attempt returns the raw generated text
    /// untouched (energy annotation included).
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in [
            RecipeProviderKind::Disabled,
            RecipeProviderKind::Openai,
            RecipeProviderKind::Groq,
            RecipeProviderKind::Gemini,
            RecipeProviderKind::HostAgent,
        ] {
            assert_eq!(
                RecipeProviderKind::from_str_or_default(&kind.to_string()),
                kind
            );
        }
    }

    #[test]
    fn test_kind_unknown_falls_back_to_disabled() {
        assert_eq!(
            RecipeProviderKind::from_str_or_default("skynet"),
            RecipeProviderKind::Disabled
        );
        assert_eq!(
            RecipeProviderKind::from_str_or_default(""),
            RecipeProviderKind::Disabled
        );
    }
}

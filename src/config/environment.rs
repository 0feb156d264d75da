// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a typed tracker configuration with defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! Environment-based configuration.
//!
//! Everything is driven by environment variables so the daemon can run as a
//! Home Assistant add-on without a config file. Only the host access token
//! is mandatory; every other value has a sensible default and logs a `warn`
//! when a malformed value falls back.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::errors::{AppError, AppResult};
use crate::llm::RecipeProviderKind;

/// Inventory document path
const ENV_INVENTORY_PATH: &str = "GROCERY_INVENTORY_PATH";
/// Home Assistant base URL
const ENV_HASS_URL: &str = "HASS_URL";
/// Long-lived access token (the supervisor token works inside an add-on)
const ENV_HASS_TOKEN: &str = "HASS_TOKEN";
/// Fallback token variable provided by the supervisor
const ENV_SUPERVISOR_TOKEN: &str = "SUPERVISOR_TOKEN";
/// Notify service under the `notify` domain
const ENV_NOTIFY_SERVICE: &str = "GROCERY_NOTIFY_SERVICE";
/// Configured recipe provider (`disabled`, `openai`, `groq`, `gemini`, `host_agent`)
const ENV_RECIPE_PROVIDER: &str = "GROCERY_RECIPE_PROVIDER";
/// Daily review time, `HH:MM`
const ENV_DAILY_REVIEW_TIME: &str = "GROCERY_DAILY_REVIEW_TIME";
/// Energy unit price entity
const ENV_PRICE_ENTITY: &str = "GROCERY_PRICE_ENTITY";
/// Cumulative household energy meter entity
const ENV_METER_ENTITY: &str = "GROCERY_METER_ENTITY";

const DEFAULT_INVENTORY_PATH: &str = "/config/grocery_inventory.json";
const DEFAULT_HASS_URL: &str = "http://supervisor/core";
const DEFAULT_NOTIFY_SERVICE: &str = "notify";
const DEFAULT_DAILY_REVIEW_TIME: (u32, u32) = (16, 0);
const DEFAULT_PRICE_ENTITY: &str = "sensor.electricity_price";
const DEFAULT_METER_ENTITY: &str = "sensor.household_energy";

/// Runtime configuration for the tracker daemon
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Path of the inventory JSON document
    pub inventory_path: PathBuf,
    /// Home Assistant base URL
    pub hass_base_url: String,
    /// Host API access token
    pub hass_token: String,
    /// Notify service name under the `notify` domain
    pub notify_service: String,
    /// Configured recipe provider
    pub recipe_provider: RecipeProviderKind,
    /// `OpenAI` API key, when configured
    pub openai_api_key: Option<String>,
    /// Groq API key, when configured
    pub groq_api_key: Option<String>,
    /// Gemini API key, when configured
    pub gemini_api_key: Option<String>,
    /// Hour of the daily review
    pub daily_review_hour: u32,
    /// Minute of the daily review
    pub daily_review_minute: u32,
    /// Entity holding the current energy unit price
    pub price_entity: String,
    /// Entity holding the cumulative energy meter reading
    pub meter_entity: String,
}

impl TrackerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails only when no host access token is configured.
    pub fn from_env() -> AppResult<Self> {
        let hass_token = optional_env(ENV_HASS_TOKEN)
            .or_else(|| optional_env(ENV_SUPERVISOR_TOKEN))
            .ok_or_else(|| {
                AppError::config_missing(format!(
                    "set {ENV_HASS_TOKEN} (or run with a {ENV_SUPERVISOR_TOKEN})"
                ))
            })?;

        let (daily_review_hour, daily_review_minute) = parse_review_time();

        Ok(Self {
            inventory_path: PathBuf::from(env_or(ENV_INVENTORY_PATH, DEFAULT_INVENTORY_PATH)),
            hass_base_url: env_or(ENV_HASS_URL, DEFAULT_HASS_URL),
            hass_token,
            notify_service: env_or(ENV_NOTIFY_SERVICE, DEFAULT_NOTIFY_SERVICE),
            recipe_provider: RecipeProviderKind::from_str_or_default(&env_or(
                ENV_RECIPE_PROVIDER,
                "disabled",
            )),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            groq_api_key: optional_env("GROQ_API_KEY"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            daily_review_hour,
            daily_review_minute,
            price_entity: env_or(ENV_PRICE_ENTITY, DEFAULT_PRICE_ENTITY),
            meter_entity: env_or(ENV_METER_ENTITY, DEFAULT_METER_ENTITY),
        })
    }
}

/// Read an environment variable with a default
fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Read an optional environment variable; empty values count as unset
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `HH:MM`, warning and falling back to the default on bad input
fn parse_review_time() -> (u32, u32) {
    let Some(raw) = optional_env(ENV_DAILY_REVIEW_TIME) else {
        return DEFAULT_DAILY_REVIEW_TIME;
    };

    match parse_hh_mm(&raw) {
        Some(parsed) => parsed,
        None => {
            warn!(
                value = %raw,
                "invalid {ENV_DAILY_REVIEW_TIME}, using {:02}:{:02}",
                DEFAULT_DAILY_REVIEW_TIME.0, DEFAULT_DAILY_REVIEW_TIME.1
            );
            DEFAULT_DAILY_REVIEW_TIME
        }
    }
}

fn parse_hh_mm(raw: &str) -> Option<(u32, u32)> {
    let (hour, minute) = raw.trim().split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hh_mm() {
        assert_eq!(parse_hh_mm("16:00"), Some((16, 0)));
        assert_eq!(parse_hh_mm(" 7:30 "), Some((7, 30)));
        assert_eq!(parse_hh_mm("24:00"), None);
        assert_eq!(parse_hh_mm("16"), None);
        assert_eq!(parse_hh_mm("sexton"), None);
    }
}

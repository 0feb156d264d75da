// ABOUTME: Host automation platform interface traits
// ABOUTME: Abstracts state publication, notifications, the shopping list and the conversation agent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Host Integration SPI
//!
//! The tracker never touches the automation platform as ambient globals;
//! every host capability is an injected trait object. One concrete
//! implementation speaks the Home Assistant REST API; tests use in-memory
//! fakes from [`crate::test_utils`].

/// Home Assistant REST implementation of the host traits
pub mod home_assistant;

pub use home_assistant::HomeAssistantClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppResult;
use crate::models::ShoppingListEntry;

/// Entity-state publication and reads (sensors, meter, energy price)
#[async_trait]
pub trait HostStates: Send + Sync {
    /// Publish an entity state with attributes
    async fn set_state(&self, entity_id: &str, state: &str, attributes: Value) -> AppResult<()>;

    /// Read an entity state as a number; `None` when the entity is missing
    /// or its state is not numeric (`unknown`, `unavailable`, ...)
    async fn numeric_state(&self, entity_id: &str) -> AppResult<Option<f64>>;

    /// Defensive read: numeric state, or `default` when the state is
    /// missing, non-numeric or the read fails
    async fn numeric_state_or(&self, entity_id: &str, default: f64) -> f64 {
        match self.numeric_state(entity_id).await {
            Ok(Some(value)) => value,
            Ok(None) | Err(_) => default,
        }
    }
}

/// User-facing notification delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Create or replace a persistent notification on the host UI
    async fn persistent(&self, title: &str, message: &str, notification_id: &str)
        -> AppResult<()>;

    /// Send a push notification through the configured notify service
    async fn push(&self, title: &str, message: &str) -> AppResult<()>;
}

/// The externally owned shopping list
///
/// The core only reads the list and appends/removes named entries; it never
/// rewrites the document wholesale.
#[async_trait]
pub trait ShoppingList: Send + Sync {
    /// All current entries, completed ones included
    async fn entries(&self) -> AppResult<Vec<ShoppingListEntry>>;

    /// Append one entry by name
    async fn add_item(&self, name: &str) -> AppResult<()>;

    /// Remove one entry by name
    async fn remove_item(&self, name: &str) -> AppResult<()>;
}

/// Host-managed text generation (no external credential required)
#[async_trait]
pub trait ConversationAgent: Send + Sync {
    /// Send a prompt to the host conversation agent and return its reply
    async fn converse(&self, text: &str) -> AppResult<String>;
}

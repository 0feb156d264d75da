// ABOUTME: In-memory fakes of the host traits and recipe providers for tests
// ABOUTME: Recording implementations so unit and integration tests run without a host or network
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! Test doubles for the host SPI and the provider abstraction.
//!
//! Everything here records its calls so tests can assert on published
//! sensors, sent notifications and attempted models without any network.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::{AppError, AppResult};
use crate::host::{ConversationAgent, HostStates, Notifier, ShoppingList};
use crate::llm::{GenerationError, RecipeProvider};
use crate::lookup::ProductLookup;
use crate::models::{InventoryItem, ProductInfo, ShoppingListEntry};

/// In-memory entity state store with scripted numeric reads
#[derive(Default)]
pub struct MemoryStates {
    published: Mutex<HashMap<String, (String, Value)>>,
    numeric: Mutex<HashMap<String, Option<f64>>>,
}

impl MemoryStates {
    /// Create an empty state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the numeric reading of an entity (`None` = unavailable)
    pub async fn set_numeric(&self, entity_id: &str, value: Option<f64>) {
        self.numeric
            .lock()
            .await
            .insert(entity_id.to_owned(), value);
    }

    /// The most recently published state and attributes of an entity
    pub async fn latest(&self, entity_id: &str) -> Option<(String, Value)> {
        self.published.lock().await.get(entity_id).cloned()
    }

    /// The most recently published state string of an entity
    pub async fn state_of(&self, entity_id: &str) -> Option<String> {
        self.latest(entity_id).await.map(|(state, _)| state)
    }
}

#[async_trait]
impl HostStates for MemoryStates {
    async fn set_state(&self, entity_id: &str, state: &str, attributes: Value) -> AppResult<()> {
        self.published
            .lock()
            .await
            .insert(entity_id.to_owned(), (state.to_owned(), attributes));
        Ok(())
    }

    async fn numeric_state(&self, entity_id: &str) -> AppResult<Option<f64>> {
        Ok(self
            .numeric
            .lock()
            .await
            .get(entity_id)
            .copied()
            .flatten())
    }
}

/// Notifier recording everything it was asked to deliver
#[derive(Default)]
pub struct RecordingNotifier {
    persistent: Mutex<Vec<(String, String, String)>>,
    push: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All persistent notifications as `(title, message, notification_id)`
    pub async fn persistent_messages(&self) -> Vec<(String, String, String)> {
        self.persistent.lock().await.clone()
    }

    /// All push notifications as `(title, message)`
    pub async fn push_messages(&self) -> Vec<(String, String)> {
        self.push.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn persistent(
        &self,
        title: &str,
        message: &str,
        notification_id: &str,
    ) -> AppResult<()> {
        self.persistent.lock().await.push((
            title.to_owned(),
            message.to_owned(),
            notification_id.to_owned(),
        ));
        Ok(())
    }

    async fn push(&self, title: &str, message: &str) -> AppResult<()> {
        self.push
            .lock()
            .await
            .push((title.to_owned(), message.to_owned()));
        Ok(())
    }
}

/// In-memory shopping list
#[derive(Default)]
pub struct MemoryShoppingList {
    entries: Mutex<Vec<ShoppingListEntry>>,
}

impl MemoryShoppingList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the list with entries
    pub async fn seed(&self, entries: Vec<ShoppingListEntry>) {
        *self.entries.lock().await = entries;
    }

    /// The current entry names, completed ones included
    pub async fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Mark an entry complete by exact name
    pub async fn mark_complete(&self, name: &str) {
        for entry in self.entries.lock().await.iter_mut() {
            if entry.name == name {
                entry.complete = true;
            }
        }
    }
}

#[async_trait]
impl ShoppingList for MemoryShoppingList {
    async fn entries(&self) -> AppResult<Vec<ShoppingListEntry>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn add_item(&self, name: &str) -> AppResult<()> {
        self.entries.lock().await.push(ShoppingListEntry {
            name: name.to_owned(),
            complete: false,
        });
        Ok(())
    }

    async fn remove_item(&self, name: &str) -> AppResult<()> {
        self.entries.lock().await.retain(|e| e.name != name);
        Ok(())
    }
}

/// Barcode lookup over a fixed map
#[derive(Default)]
pub struct StaticLookup {
    products: HashMap<String, ProductInfo>,
}

impl StaticLookup {
    /// Create an empty lookup (every barcode unknown)
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product for a barcode
    #[must_use]
    pub fn with_product(mut self, barcode: &str, name: &str, category: &str) -> Self {
        self.products.insert(
            barcode.to_owned(),
            ProductInfo {
                name: name.to_owned(),
                category: category.to_owned(),
                image_url: String::new(),
            },
        );
        self
    }
}

#[async_trait]
impl ProductLookup for StaticLookup {
    async fn lookup(&self, barcode: &str) -> Option<ProductInfo> {
        self.products.get(barcode).cloned()
    }
}

/// One scripted generation outcome
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return this text
    Text(String),
    /// Answer with a rate-limit classification
    RateLimited,
    /// Answer with a hard failure
    Fail,
}

/// Recipe provider replaying a scripted outcome queue
pub struct ScriptedProvider {
    name: &'static str,
    requires_credential: bool,
    models: Vec<String>,
    script: Mutex<VecDeque<ScriptedOutcome>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Create a provider with the given model list and outcome script.
    ///
    /// Outcomes are consumed one per `generate` call; an exhausted script
    /// produces hard failures.
    pub fn new(name: &'static str, models: &[&str], script: Vec<ScriptedOutcome>) -> Self {
        Self {
            name,
            requires_credential: false,
            models: models.iter().map(|&m| m.to_owned()).collect(),
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The model names passed to `generate`, in call order
    pub async fn attempted_models(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RecipeProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires_credential(&self) -> bool {
        self.requires_credential
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn generate(&self, model: &str, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.lock().await.push(model.to_owned());
        match self.script.lock().await.pop_front() {
            Some(ScriptedOutcome::Text(text)) => Ok(text),
            Some(ScriptedOutcome::RateLimited) => Err(GenerationError::RateLimited),
            Some(ScriptedOutcome::Fail) | None => Err(GenerationError::Failed(
                AppError::external_service(self.name, "scripted failure"),
            )),
        }
    }
}

/// Conversation agent replying with a fixed string
pub struct FixedAgent {
    reply: String,
}

impl FixedAgent {
    /// Create an agent always answering with `reply`
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_owned(),
        }
    }
}

#[async_trait]
impl ConversationAgent for FixedAgent {
    async fn converse(&self, _text: &str) -> AppResult<String> {
        Ok(self.reply.clone())
    }
}

/// Build a plain inventory item for tests
pub fn test_item(name: &str, expiry: Option<&str>) -> InventoryItem {
    InventoryItem::new(
        "",
        name,
        1,
        "st",
        expiry.map(str::to_owned),
        "",
        "manual",
        "",
        NaiveDate::from_ymd_opt(2025, 8, 24).unwrap_or_default(),
    )
}

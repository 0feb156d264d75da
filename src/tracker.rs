// ABOUTME: Operation-surface facade over the inventory document and host collaborators
// ABOUTME: Implements scan/manual add-remove semantics, item settings and derived sensor publication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Grocery Tracker Facade
//!
//! Every host entry point maps to one method here. Each mutating operation
//! is one load → mutate → save cycle under the document mutex, followed by
//! derived sensor publication and a user-facing notification.
//!
//! Failure policy (nothing here is fatal):
//! - external lookups and shopping-list calls degrade with a `warn!`
//! - expected negative outcomes (unknown barcode, empty list, disabled
//!   provider, nothing expiring) become informational notifications
//! - only storage failures propagate as errors, and the daemon logs them
//!   at the call site

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::{self, sensors};
use crate::cooking::CookingSessionTracker;
use crate::errors::AppResult;
use crate::host::{HostStates, Notifier, ShoppingList};
use crate::llm::{extract_annotation, ChainOutcome, FallbackChain, RecipeProviderKind};
use crate::lookup::ProductLookup;
use crate::models::{
    InventoryDocument, InventoryItem, Location, ProductInfo, WasteEntry, WasteSource,
};
use crate::shopping::ShoppingListReconciler;
use crate::stats;
use crate::store::InventoryStore;

/// One item line of the daily digest
#[derive(Debug, Clone)]
pub struct DigestItem {
    /// Item name
    pub name: String,
    /// Expiry date string, when known
    pub expiry_date: Option<String>,
    /// Units on hand
    pub quantity: i64,
    /// Unit label
    pub unit: String,
}

impl DigestItem {
    fn from_item(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            expiry_date: item.expiry_date.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
        }
    }
}

/// Result of the daily freshness pass
#[derive(Debug, Clone, Default)]
pub struct DailyDigest {
    /// Items past their expiry date
    pub expired: Vec<DigestItem>,
    /// Items expiring within the window
    pub expiring: Vec<DigestItem>,
    /// Inventory summary (first 20 items)
    pub inventory: Vec<DigestItem>,
    /// Number of shopping-list insertion attempts made by this pass
    pub suggested: usize,
}

impl DailyDigest {
    /// Whether there is nothing to report
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.expiring.is_empty()
    }
}

/// Number of inventory lines included in the daily digest
const DIGEST_INVENTORY_LIMIT: usize = 20;

/// The household grocery tracker
pub struct GroceryTracker {
    store: InventoryStore,
    /// Critical section for load → mutate → save; the host may fire entry
    /// points concurrently and the document must not interleave
    doc_lock: Mutex<()>,
    states: Arc<dyn HostStates>,
    notifier: Arc<dyn Notifier>,
    reconciler: ShoppingListReconciler,
    lookup: Arc<dyn ProductLookup>,
    chain: FallbackChain,
    cooking: CookingSessionTracker,
    price_entity: String,
}

impl GroceryTracker {
    /// Wire the tracker from its collaborators
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: InventoryStore,
        states: Arc<dyn HostStates>,
        notifier: Arc<dyn Notifier>,
        shopping_list: Arc<dyn ShoppingList>,
        lookup: Arc<dyn ProductLookup>,
        chain: FallbackChain,
        cooking: CookingSessionTracker,
        price_entity: &str,
    ) -> Self {
        Self {
            store,
            doc_lock: Mutex::new(()),
            states,
            notifier,
            reconciler: ShoppingListReconciler::new(shopping_list),
            lookup,
            chain,
            cooking,
            price_entity: price_entity.to_owned(),
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    // ------------------------------------------------------------------
    // Scan operations
    // ------------------------------------------------------------------

    /// Add a scanned item, merging with an existing entry when barcode and
    /// expiry date both match.
    pub async fn scan_add(
        &self,
        barcode: &str,
        quantity: i64,
        expiry_date: Option<&str>,
        source: &str,
        location: Option<Location>,
        name_override: Option<&str>,
    ) -> AppResult<()> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            warn!("scan_add called without a barcode");
            return Ok(());
        }
        let quantity = quantity.max(1);
        info!(barcode, quantity, source, "adding scanned item");

        let product = self.lookup.lookup(barcode).await.unwrap_or_default();
        let name = resolve_name(name_override, &product, barcode);

        {
            let _guard = self.doc_lock.lock().await;
            let mut doc = self.store.load().await;

            let merged = doc.items.iter_mut().find(|item| {
                item.barcode == barcode && item.expiry_date.as_deref() == expiry_date
            });

            if let Some(item) = merged {
                item.quantity += quantity;
                // Replenishment opens a new freshness episode.
                item.shopping_list_suggested = false;
            } else {
                let mut item = InventoryItem::new(
                    barcode,
                    &name,
                    quantity,
                    "st",
                    expiry_date.map(str::to_owned),
                    &product.category,
                    source,
                    &product.image_url,
                    Self::today(),
                );
                if let Some(location) = location {
                    item.location = location;
                }
                doc.items.push(item);
            }

            self.store.save(&doc).await?;
            self.publish_sensors(&doc).await;
        }

        let qty_txt = if quantity > 1 {
            format!(" ×{quantity}")
        } else {
            String::new()
        };
        let exp_txt = expiry_date
            .map(|d| format!(" (bäst före {d})"))
            .unwrap_or_default();
        self.notify_action("✅ Tillagd i lager", &format!("{name}{qty_txt}{exp_txt}"))
            .await;
        Ok(())
    }

    /// Remove one unit of a scanned item.
    ///
    /// Always appends a waste-log entry. Deletion at zero quantity takes
    /// precedence over the low-stock signal; both trigger a shopping-list
    /// re-insertion attempt.
    pub async fn scan_remove(&self, barcode: &str, source: &str) -> AppResult<()> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            warn!("scan_remove called without a barcode");
            return Ok(());
        }
        info!(barcode, source, "removing scanned item");

        let notification;
        {
            let _guard = self.doc_lock.lock().await;
            let mut doc = self.store.load().await;

            let Some(pos) = doc.items.iter().position(|i| i.barcode == barcode) else {
                // Unknown waste still gets attributed as well as we can.
                let product = self.lookup.lookup(barcode).await.unwrap_or_default();
                let name = resolve_name(None, &product, barcode);
                doc.waste_log.push(WasteEntry {
                    date: Self::today(),
                    name,
                    barcode: barcode.to_owned(),
                    source: WasteSource::UnknownRemoved,
                });
                self.store.save(&doc).await?;
                self.publish_sensors(&doc).await;

                self.notify_action(
                    "⚠️ Vara ej i lager",
                    &format!("Streckkod {barcode} finns inte i lagret."),
                )
                .await;
                return Ok(());
            };

            let item = &mut doc.items[pos];
            item.quantity -= 1;
            let name = item.name.clone();
            let remaining = item.quantity;
            let crossed_low_stock = item.min_quantity > 0 && remaining <= item.min_quantity;

            doc.waste_log.push(WasteEntry {
                date: Self::today(),
                name: name.clone(),
                barcode: barcode.to_owned(),
                source: WasteSource::ScanRemove,
            });

            if remaining <= 0 {
                // Deletion first: an item never rests at quantity <= 0.
                doc.items.remove(pos);
                self.suggest_restock(&name).await;
            } else if crossed_low_stock {
                self.suggest_restock(&name).await;
                doc.items[pos].shopping_list_suggested = true;
            }

            self.store.save(&doc).await?;
            self.publish_sensors(&doc).await;

            let remain_txt = if remaining > 0 {
                format!(" ({remaining} kvar)")
            } else {
                String::new()
            };
            notification = format!("{name}{remain_txt}");
        }

        self.notify_action("🗑️ Borttagen", &notification).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Manual operations
    // ------------------------------------------------------------------

    /// Add an item manually. Manual entries never merge.
    #[allow(clippy::too_many_arguments)]
    pub async fn manual_add(
        &self,
        name: &str,
        quantity: i64,
        unit: &str,
        expiry_date: Option<&str>,
        category: &str,
        barcode: &str,
        min_quantity: i64,
        location: Option<Location>,
    ) -> AppResult<()> {
        let name = name.trim();
        if name.is_empty() {
            warn!("manual_add called without a name");
            return Ok(());
        }
        let quantity = quantity.max(1);

        {
            let _guard = self.doc_lock.lock().await;
            let mut doc = self.store.load().await;

            let mut item = InventoryItem::new(
                barcode,
                name,
                quantity,
                unit,
                expiry_date.map(str::to_owned),
                category,
                "manual",
                "",
                Self::today(),
            );
            item.min_quantity = min_quantity.max(0);
            if let Some(location) = location {
                item.location = location;
            }
            doc.items.push(item);

            self.store.save(&doc).await?;
            self.publish_sensors(&doc).await;
        }

        let qty_txt = if unit == "st" {
            if quantity > 1 {
                format!("×{quantity} ")
            } else {
                String::new()
            }
        } else {
            format!("{quantity} {unit} ")
        };
        self.notify_action("✅ Manuellt tillagd", &format!("{qty_txt}{name}"))
            .await;
        Ok(())
    }

    /// Delete an item by id, unconditionally.
    pub async fn manual_remove(&self, item_id: &str) -> AppResult<()> {
        let Some(id) = parse_item_id(item_id) else {
            return Ok(());
        };

        let name;
        {
            let _guard = self.doc_lock.lock().await;
            let mut doc = self.store.load().await;

            let Some(pos) = doc.items.iter().position(|i| i.id == id) else {
                debug!(%id, "manual_remove: no such item");
                return Ok(());
            };

            let item = doc.items.remove(pos);
            name = item.name;
            doc.waste_log.push(WasteEntry {
                date: Self::today(),
                name: name.clone(),
                barcode: item.barcode,
                source: WasteSource::ManualRemove,
            });
            self.suggest_restock(&name).await;

            self.store.save(&doc).await?;
            self.publish_sensors(&doc).await;
        }

        self.notify_action("🗑️ Borttagen", &name).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Item settings
    // ------------------------------------------------------------------

    /// Update an item's best-before date; opens a new freshness episode.
    pub async fn set_expiry(&self, item_id: &str, expiry_date: Option<&str>) -> AppResult<()> {
        self.update_item(item_id, |item| {
            item.expiry_date = expiry_date.map(str::to_owned);
            item.shopping_list_suggested = false;
        })
        .await
    }

    /// Update an item's low-stock threshold (0 disables it).
    pub async fn set_min_quantity(&self, item_id: &str, min_quantity: i64) -> AppResult<()> {
        self.update_item(item_id, |item| {
            item.min_quantity = min_quantity.max(0);
        })
        .await
    }

    /// Move an item to another storage location.
    pub async fn set_location(&self, item_id: &str, location: Location) -> AppResult<()> {
        self.update_item(item_id, |item| {
            item.location = location;
        })
        .await
    }

    async fn update_item(
        &self,
        item_id: &str,
        apply: impl FnOnce(&mut InventoryItem) + Send,
    ) -> AppResult<()> {
        let Some(id) = parse_item_id(item_id) else {
            return Ok(());
        };

        let _guard = self.doc_lock.lock().await;
        let mut doc = self.store.load().await;

        let Some(item) = doc.items.iter_mut().find(|i| i.id == id) else {
            debug!(%id, "update: no such item");
            return Ok(());
        };
        apply(item);

        self.store.save(&doc).await?;
        self.publish_sensors(&doc).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived state and shopping list
    // ------------------------------------------------------------------

    /// Reload the document and republish all derived sensors.
    pub async fn refresh(&self) -> AppResult<()> {
        let doc = self.store.load().await;
        self.publish_sensors(&doc).await;
        info!("inventory reloaded");
        Ok(())
    }

    /// Send the current uncompleted shopping list as a push notification.
    pub async fn push_shopping_list(&self) -> AppResult<()> {
        let names = match self.reconciler.uncompleted_names().await {
            Ok(names) => names,
            Err(e) => {
                warn!("could not read shopping list: {e}");
                self.notify_action(
                    "🛒 Inköpslistan",
                    "Kunde inte läsa inköpslistan just nu.",
                )
                .await;
                return Ok(());
            }
        };

        if names.is_empty() {
            self.notify_action("🛒 Inköpslistan är tom", "Inget att handla.")
                .await;
            return Ok(());
        }

        let body = names
            .iter()
            .map(|n| format!("• {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        if let Err(e) = self.notifier.push("🛒 Inköpslista", &body).await {
            warn!("push notification failed: {e}");
        }
        Ok(())
    }

    /// Manually reconcile expired, expiring and low-stock items into the
    /// shopping list. Unlike the daily pass this treats low stock as a
    /// restock request too.
    pub async fn generate_shopping_list(&self) -> AppResult<()> {
        let mut attempted = 0;
        {
            let _guard = self.doc_lock.lock().await;
            let mut doc = self.store.load().await;

            let candidate_ids: Vec<Uuid> = {
                let stats = stats::classify(&doc.items, Self::today());
                let mut ids: Vec<Uuid> = stats
                    .expired
                    .iter()
                    .chain(stats.expiring_soon.iter())
                    .chain(stats.low_stock.iter())
                    .map(|i| i.id)
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            };

            for id in candidate_ids {
                if let Some(item) = doc.items.iter_mut().find(|i| i.id == id) {
                    let name = item.name.clone();
                    self.suggest_restock(&name).await;
                    item.shopping_list_suggested = true;
                    attempted += 1;
                }
            }

            if attempted > 0 {
                self.store.save(&doc).await?;
            }
            self.publish_sensors(&doc).await;
        }

        self.notify_action(
            "🛒 Inköpslista uppdaterad",
            &format!("{attempted} varor föreslagna."),
        )
        .await;
        Ok(())
    }

    /// Remove every completed entry from the external shopping list.
    pub async fn clear_completed_shopping_list(&self) -> AppResult<()> {
        match self.reconciler.clear_completed().await {
            Ok(removed) => {
                self.notify_action(
                    "🛒 Inköpslista rensad",
                    &format!("{removed} avklarade varor borttagna."),
                )
                .await;
            }
            Err(e) => {
                warn!("clear_completed failed: {e}");
                self.notify_action("🛒 Inköpslistan", "Kunde inte rensa inköpslistan just nu.")
                    .await;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Recipes
    // ------------------------------------------------------------------

    /// Ask the configured provider chain for a recipe using soon-to-expire
    /// items, publish it with parsed energy metadata and notify the user.
    pub async fn suggest_recipes(
        &self,
        provider_override: Option<RecipeProviderKind>,
    ) -> AppResult<()> {
        let doc = {
            let _guard = self.doc_lock.lock().await;
            self.store.load().await
        };

        let today = Self::today();
        let stats = stats::classify(&doc.items, today);
        if stats.is_all_fresh() {
            self.notify_action("🍳 Inga recept", "Inga varor går ut inom 2 dagar.")
                .await;
            return Ok(());
        }

        let prompt = build_recipe_prompt(&stats.expired, &stats.expiring_soon, &doc.items);
        match self.chain.generate(&prompt, provider_override).await {
            ChainOutcome::NotConfigured => {
                self.notify_action(
                    "🤖 Receptförslag ej konfigurerat",
                    "Ingen receptleverantör är konfigurerad.",
                )
                .await;
            }
            ChainOutcome::Exhausted => {
                self.notify_action(
                    "🤖 Receptförslag misslyckades",
                    "Ingen modell kunde generera ett recept just nu.",
                )
                .await;
            }
            ChainOutcome::Success {
                provider,
                model,
                text,
            } => {
                let (display, estimate) = extract_annotation(&text);

                let mut attributes = Map::new();
                attributes.insert("friendly_name".into(), json!("Senaste receptet"));
                attributes.insert("icon".into(), json!("mdi:chef-hat"));
                attributes.insert("recipe".into(), json!(display));
                attributes.insert("provider".into(), json!(provider));
                attributes.insert("model".into(), json!(model));

                if let Some(estimate) = estimate {
                    attributes.insert("energy_minutes".into(), json!(estimate.minutes));
                    attributes.insert("appliance".into(), json!(estimate.appliance.as_str()));
                    attributes.insert("estimated_kwh".into(), json!(estimate.kwh));

                    if let Ok(Some(price)) =
                        self.states.numeric_state(&self.price_entity).await
                    {
                        attributes
                            .insert("estimated_cost".into(), json!(estimate.cost_at(price)));
                        attributes.insert("unit_price".into(), json!(price));
                    }
                }

                if let Err(e) = self
                    .states
                    .set_state(sensors::LAST_RECIPE, &model, Value::Object(attributes))
                    .await
                {
                    warn!("could not publish recipe sensor: {e}");
                }

                if let Err(e) = self.notifier.push("🍳 Receptförslag", &display).await {
                    warn!("recipe notification failed: {e}");
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cooking sessions
    // ------------------------------------------------------------------

    /// Begin a metered cooking session.
    pub async fn start_cooking(&self) -> AppResult<()> {
        self.cooking.start().await
    }

    /// End the metered cooking session and price the consumption.
    pub async fn stop_cooking(&self) -> AppResult<()> {
        self.cooking.stop().await
    }

    // ------------------------------------------------------------------
    // Daily review support
    // ------------------------------------------------------------------

    /// The daily freshness pass: classify, insert un-suggested expired and
    /// expiring items into the shopping list (at most once per freshness
    /// episode), persist the flags and republish sensors.
    pub async fn freshness_pass(&self) -> AppResult<DailyDigest> {
        let _guard = self.doc_lock.lock().await;
        let mut doc = self.store.load().await;
        let today = Self::today();

        let suggested = match self
            .reconciler
            .suggest_freshness_candidates(&mut doc, today)
            .await
        {
            Ok(suggested) => suggested,
            Err(e) => {
                warn!("shopping list reconciliation failed: {e}");
                0
            }
        };
        if suggested > 0 {
            self.store.save(&doc).await?;
        }
        self.publish_sensors(&doc).await;

        let stats = stats::classify(&doc.items, today);
        let digest = DailyDigest {
            expired: stats
                .expired
                .iter()
                .copied()
                .map(DigestItem::from_item)
                .collect(),
            expiring: stats
                .expiring_soon
                .iter()
                .copied()
                .map(DigestItem::from_item)
                .collect(),
            inventory: doc
                .items
                .iter()
                .take(DIGEST_INVENTORY_LIMIT)
                .map(DigestItem::from_item)
                .collect(),
            suggested,
        };
        Ok(digest)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Best-effort shopping-list insertion; failures degrade with a log line.
    async fn suggest_restock(&self, name: &str) {
        if let Err(e) = self.reconciler.add_if_absent(name).await {
            warn!(name, "shopping list insertion failed: {e}");
        }
    }

    /// Publish all derived sensors; individual failures degrade with a log
    /// line so a flaky host connection never blocks an operation.
    async fn publish_sensors(&self, doc: &InventoryDocument) {
        let stats = stats::classify(&doc.items, Self::today());

        let publications = [
            (
                sensors::TOTAL_ITEMS,
                stats.total.to_string(),
                json!({
                    "friendly_name": "Matvaror i lager",
                    "icon": "mdi:fridge",
                    "unit_of_measurement": "st",
                    "items": doc.items,
                }),
            ),
            (
                sensors::EXPIRING_SOON,
                stats.expiring_soon.len().to_string(),
                json!({
                    "friendly_name": "Går ut inom 2 dagar",
                    "icon": "mdi:clock-alert-outline",
                    "unit_of_measurement": "st",
                    "items": stats.expiring_soon,
                }),
            ),
            (
                sensors::EXPIRED,
                stats.expired.len().to_string(),
                json!({
                    "friendly_name": "Utgångna varor",
                    "icon": "mdi:alert-circle-outline",
                    "unit_of_measurement": "st",
                    "items": stats.expired,
                }),
            ),
            (
                sensors::LOW_STOCK,
                stats.low_stock.len().to_string(),
                json!({
                    "friendly_name": "Lågt lager",
                    "icon": "mdi:basket-unfill",
                    "unit_of_measurement": "st",
                    "items": stats.low_stock,
                }),
            ),
            (
                sensors::WASTE_LOG,
                doc.waste_log.len().to_string(),
                json!({
                    "friendly_name": "Svinnlogg",
                    "icon": "mdi:delete-variant",
                    "entries": doc.recent_waste(),
                }),
            ),
        ];

        for (entity_id, state, attributes) in publications {
            if let Err(e) = self.states.set_state(entity_id, &state, attributes).await {
                warn!(entity_id, "sensor publication failed: {e}");
            }
        }
    }

    /// Best-effort persistent notification.
    async fn notify_action(&self, title: &str, message: &str) {
        if let Err(e) = self
            .notifier
            .persistent(title, message, constants::NOTIFICATION_ID)
            .await
        {
            warn!("notification failed: {e}");
        }
    }
}

/// Resolve the display name for a scanned barcode
fn resolve_name(name_override: Option<&str>, product: &ProductInfo, barcode: &str) -> String {
    name_override
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .or_else(|| (!product.name.is_empty()).then(|| product.name.clone()))
        .unwrap_or_else(|| format!("Okänd vara ({barcode})"))
}

/// Parse an item id, logging instead of failing on malformed input
fn parse_item_id(item_id: &str) -> Option<Uuid> {
    match Uuid::parse_str(item_id.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(item_id, "malformed item id");
            None
        }
    }
}

/// Build the Swedish recipe prompt, asking for the trailing energy
/// annotation the post-processing step parses back out.
fn build_recipe_prompt(
    expired: &[&InventoryItem],
    expiring: &[&InventoryItem],
    items: &[InventoryItem],
) -> String {
    let urgent: Vec<String> = expired
        .iter()
        .chain(expiring.iter())
        .map(|i| i.name.clone())
        .collect();

    let larder: Vec<String> = items
        .iter()
        .take(DIGEST_INVENTORY_LIMIT)
        .map(|i| format!("{} ({} {})", i.name, i.quantity, i.unit))
        .collect();

    format!(
        "Föreslå ett enkelt recept på svenska som i första hand använder: {}.\n\
         Övrigt i lager: {}.\n\
         Avsluta svaret med exakt en rad på formen \
         'ENERGY: <minuter>min APPLIANCE: <spis|ugn|mikro>'.",
        urgent.join(", "),
        larder.join(", ")
    )
}

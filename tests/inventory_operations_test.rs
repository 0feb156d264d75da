// ABOUTME: Integration tests for the inventory operation surface
// ABOUTME: Covers scan/manual add-remove semantics, merge rules, waste logging and sensor publication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! Inventory Operation Tests
//!
//! Exercises the tracker facade against in-memory host fakes and a
//! temporary document file.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;

use tempfile::TempDir;

use grocery_tracker::constants::sensors;
use grocery_tracker::cooking::CookingSessionTracker;
use grocery_tracker::llm::{FallbackChain, RecipeProviderKind};
use grocery_tracker::models::{Location, WasteSource};
use grocery_tracker::store::InventoryStore;
use grocery_tracker::test_utils::{
    MemoryShoppingList, MemoryStates, RecordingNotifier, ScriptedProvider, StaticLookup,
};
use grocery_tracker::tracker::GroceryTracker;

struct Fixture {
    tracker: GroceryTracker,
    states: Arc<MemoryStates>,
    notifier: Arc<RecordingNotifier>,
    shopping: Arc<MemoryShoppingList>,
    store: InventoryStore,
    _dir: TempDir,
}

fn fixture(lookup: StaticLookup) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    let states = Arc::new(MemoryStates::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let shopping = Arc::new(MemoryShoppingList::new());

    let chain = FallbackChain::new(
        RecipeProviderKind::Disabled,
        None,
        None,
        None,
        Arc::new(ScriptedProvider::new("host_agent", &["conversation"], vec![])),
    );
    let cooking = CookingSessionTracker::new(
        states.clone(),
        notifier.clone(),
        "sensor.household_energy",
        "sensor.electricity_price",
    );
    let tracker = GroceryTracker::new(
        InventoryStore::new(&path),
        states.clone(),
        notifier.clone(),
        shopping.clone(),
        Arc::new(lookup),
        chain,
        cooking,
        "sensor.electricity_price",
    );

    Fixture {
        tracker,
        states,
        notifier,
        shopping,
        store: InventoryStore::new(&path),
        _dir: dir,
    }
}

#[tokio::test]
async fn test_scan_add_merges_on_same_barcode_and_expiry() {
    let fx = fixture(StaticLookup::new().with_product("700", "Mjölk", "dairy"));

    fx.tracker
        .scan_add("700", 1, Some("2030-01-01"), "mobile", None, None)
        .await
        .unwrap();

    // Simulate an earlier automatic suggestion on the stored item.
    let mut doc = fx.store.load().await;
    doc.items[0].shopping_list_suggested = true;
    fx.store.save(&doc).await.unwrap();

    fx.tracker
        .scan_add("700", 2, Some("2030-01-01"), "mobile", None, None)
        .await
        .unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].quantity, 3);
    assert!(!doc.items[0].shopping_list_suggested, "replenishment resets the flag");
}

#[tokio::test]
async fn test_scan_add_different_expiry_creates_separate_entries() {
    let fx = fixture(StaticLookup::new().with_product("700", "Mjölk", "dairy"));

    fx.tracker
        .scan_add("700", 1, Some("2030-01-01"), "mobile", None, None)
        .await
        .unwrap();
    fx.tracker
        .scan_add("700", 1, Some("2030-02-01"), "mobile", None, None)
        .await
        .unwrap();
    fx.tracker
        .scan_add("700", 1, None, "mobile", None, None)
        .await
        .unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items.len(), 3);
}

#[tokio::test]
async fn test_scan_add_name_resolution() {
    let fx = fixture(StaticLookup::new().with_product("700", "Mjölk", "dairy"));

    fx.tracker
        .scan_add("700", 1, None, "mobile", None, Some("Lättmjölk"))
        .await
        .unwrap();
    fx.tracker
        .scan_add("999", 1, None, "mobile", None, None)
        .await
        .unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items[0].name, "Lättmjölk");
    assert_eq!(doc.items[1].name, "Okänd vara (999)");
    assert_eq!(doc.items[0].category, "dairy");
}

#[tokio::test]
async fn test_scan_add_applies_location() {
    let fx = fixture(StaticLookup::new());

    fx.tracker
        .scan_add("1", 1, None, "mobile", Some(Location::Freezer), Some("Glass"))
        .await
        .unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items[0].location, Location::Freezer);
}

#[tokio::test]
async fn test_scan_remove_decrements_and_logs_waste() {
    let fx = fixture(StaticLookup::new());
    fx.tracker
        .scan_add("1", 3, None, "mobile", None, Some("Yoghurt"))
        .await
        .unwrap();

    fx.tracker.scan_remove("1", "mobile").await.unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].quantity, 2);
    assert_eq!(doc.waste_log.len(), 1);
    assert_eq!(doc.waste_log[0].source, WasteSource::ScanRemove);
    assert_eq!(doc.waste_log[0].name, "Yoghurt");
}

#[tokio::test]
async fn test_scan_remove_deletion_takes_precedence_over_low_stock() {
    let fx = fixture(StaticLookup::new());
    fx.tracker
        .scan_add("1", 1, None, "mobile", None, Some("Smör"))
        .await
        .unwrap();
    let mut doc = fx.store.load().await;
    doc.items[0].min_quantity = 3;
    fx.store.save(&doc).await.unwrap();

    fx.tracker.scan_remove("1", "mobile").await.unwrap();

    let doc = fx.store.load().await;
    assert!(doc.items.is_empty(), "drained item is deleted, never kept at zero");
    assert_eq!(fx.shopping.names().await, vec!["Smör".to_owned()]);
}

#[tokio::test]
async fn test_scan_remove_low_stock_crossing_suggests_once() {
    let fx = fixture(StaticLookup::new());
    fx.tracker
        .scan_add("1", 3, None, "mobile", None, Some("Ägg"))
        .await
        .unwrap();
    let mut doc = fx.store.load().await;
    doc.items[0].min_quantity = 2;
    fx.store.save(&doc).await.unwrap();

    fx.tracker.scan_remove("1", "mobile").await.unwrap();
    fx.tracker.scan_remove("1", "mobile").await.unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items[0].quantity, 1);
    assert!(doc.items[0].shopping_list_suggested);
    // Dedup keeps the external list at one entry despite two crossings.
    assert_eq!(fx.shopping.names().await, vec!["Ägg".to_owned()]);
}

#[tokio::test]
async fn test_scan_remove_unknown_barcode_logs_unknown_waste() {
    let fx = fixture(StaticLookup::new().with_product("404", "Ost", "dairy"));

    fx.tracker.scan_remove("404", "mobile").await.unwrap();

    let doc = fx.store.load().await;
    assert!(doc.items.is_empty());
    assert_eq!(doc.waste_log.len(), 1);
    assert_eq!(doc.waste_log[0].source, WasteSource::UnknownRemoved);
    assert_eq!(doc.waste_log[0].name, "Ost");

    let notes = fx.notifier.persistent_messages().await;
    assert!(notes
        .iter()
        .any(|(title, msg, _)| title.contains("Vara ej i lager") && msg.contains("404")));
}

#[tokio::test]
async fn test_manual_add_never_merges() {
    let fx = fixture(StaticLookup::new());

    fx.tracker
        .manual_add("Pasta", 1, "st", None, "pantry staples", "", 0, None)
        .await
        .unwrap();
    fx.tracker
        .manual_add("Pasta", 1, "st", None, "pantry staples", "", 0, None)
        .await
        .unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items.len(), 2);
    assert_ne!(doc.items[0].id, doc.items[1].id);
    assert_eq!(doc.items[0].source, "manual");
}

#[tokio::test]
async fn test_manual_remove_deletes_unconditionally() {
    let fx = fixture(StaticLookup::new());
    fx.tracker
        .manual_add("Mjöl", 5, "kg", None, "", "", 0, None)
        .await
        .unwrap();
    let id = fx.store.load().await.items[0].id.to_string();

    fx.tracker.manual_remove(&id).await.unwrap();

    let doc = fx.store.load().await;
    assert!(doc.items.is_empty());
    assert_eq!(doc.waste_log[0].source, WasteSource::ManualRemove);
    assert_eq!(fx.shopping.names().await, vec!["Mjöl".to_owned()]);
}

#[tokio::test]
async fn test_manual_remove_tolerates_bad_and_missing_ids() {
    let fx = fixture(StaticLookup::new());
    fx.tracker
        .manual_add("Ris", 1, "st", None, "", "", 0, None)
        .await
        .unwrap();

    fx.tracker.manual_remove("not-a-uuid").await.unwrap();
    fx.tracker
        .manual_remove("00000000-0000-0000-0000-000000000000")
        .await
        .unwrap();

    assert_eq!(fx.store.load().await.items.len(), 1);
}

#[tokio::test]
async fn test_set_expiry_opens_new_freshness_episode() {
    let fx = fixture(StaticLookup::new());
    fx.tracker
        .manual_add("Fil", 1, "st", Some("2030-01-01"), "", "", 0, None)
        .await
        .unwrap();
    let mut doc = fx.store.load().await;
    doc.items[0].shopping_list_suggested = true;
    fx.store.save(&doc).await.unwrap();
    let id = doc.items[0].id.to_string();

    fx.tracker
        .set_expiry(&id, Some("2030-06-01"))
        .await
        .unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items[0].expiry_date.as_deref(), Some("2030-06-01"));
    assert!(!doc.items[0].shopping_list_suggested);
}

#[tokio::test]
async fn test_item_setting_updates() {
    let fx = fixture(StaticLookup::new());
    fx.tracker
        .manual_add("Köttfärs", 1, "st", None, "", "", 0, None)
        .await
        .unwrap();
    let id = fx.store.load().await.items[0].id.to_string();

    fx.tracker.set_min_quantity(&id, 2).await.unwrap();
    fx.tracker.set_location(&id, Location::Freezer).await.unwrap();
    fx.tracker.set_min_quantity(&id, -5).await.unwrap();

    let doc = fx.store.load().await;
    assert_eq!(doc.items[0].min_quantity, 0, "negative thresholds clamp to disabled");
    assert_eq!(doc.items[0].location, Location::Freezer);
}

#[tokio::test]
async fn test_operations_publish_sensors() {
    let fx = fixture(StaticLookup::new());

    fx.tracker
        .scan_add("1", 2, None, "mobile", None, Some("Bröd"))
        .await
        .unwrap();

    assert_eq!(
        fx.states.state_of(sensors::TOTAL_ITEMS).await.as_deref(),
        Some("1")
    );
    let (_, attrs) = fx.states.latest(sensors::TOTAL_ITEMS).await.unwrap();
    assert_eq!(attrs["items"][0]["name"], "Bröd");

    fx.tracker.scan_remove("1", "mobile").await.unwrap();
    assert_eq!(
        fx.states.state_of(sensors::WASTE_LOG).await.as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_blank_identifiers_are_ignored() {
    let fx = fixture(StaticLookup::new());

    fx.tracker
        .scan_add("   ", 1, None, "mobile", None, None)
        .await
        .unwrap();
    fx.tracker.scan_remove("", "mobile").await.unwrap();
    fx.tracker
        .manual_add("  ", 1, "st", None, "", "", 0, None)
        .await
        .unwrap();

    let doc = fx.store.load().await;
    assert!(doc.items.is_empty());
    assert!(doc.waste_log.is_empty());
}

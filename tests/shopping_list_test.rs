// ABOUTME: Integration tests for shopping-list reconciliation
// ABOUTME: Covers case-insensitive dedup, completed-entry handling and the freshness walk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;

use chrono::NaiveDate;

use grocery_tracker::models::{InventoryDocument, ShoppingListEntry};
use grocery_tracker::shopping::ShoppingListReconciler;
use grocery_tracker::test_utils::{test_item, MemoryShoppingList};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 24).unwrap()
}

#[tokio::test]
async fn test_add_if_absent_is_case_insensitive() {
    let list = Arc::new(MemoryShoppingList::new());
    let reconciler = ShoppingListReconciler::new(list.clone());

    assert!(reconciler.add_if_absent("Milk").await.unwrap());
    assert!(!reconciler.add_if_absent("milk").await.unwrap());
    assert!(!reconciler.add_if_absent("  MILK  ").await.unwrap());

    assert_eq!(list.names().await, vec!["Milk".to_owned()]);
}

#[tokio::test]
async fn test_completed_entry_does_not_block_reinsertion() {
    let list = Arc::new(MemoryShoppingList::new());
    list.seed(vec![ShoppingListEntry {
        name: "Milk".to_owned(),
        complete: true,
    }])
    .await;
    let reconciler = ShoppingListReconciler::new(list.clone());

    assert!(reconciler.add_if_absent("milk").await.unwrap());
    assert_eq!(list.names().await.len(), 2);
}

#[tokio::test]
async fn test_blank_names_are_rejected() {
    let list = Arc::new(MemoryShoppingList::new());
    let reconciler = ShoppingListReconciler::new(list.clone());

    assert!(!reconciler.add_if_absent("   ").await.unwrap());
    assert!(list.names().await.is_empty());
}

#[tokio::test]
async fn test_clear_completed_leaves_open_entries() {
    let list = Arc::new(MemoryShoppingList::new());
    list.seed(vec![
        ShoppingListEntry {
            name: "Milk".to_owned(),
            complete: true,
        },
        ShoppingListEntry {
            name: "Bread".to_owned(),
            complete: false,
        },
        ShoppingListEntry {
            name: "Eggs".to_owned(),
            complete: true,
        },
    ])
    .await;
    let reconciler = ShoppingListReconciler::new(list.clone());

    assert_eq!(reconciler.clear_completed().await.unwrap(), 2);
    assert_eq!(list.names().await, vec!["Bread".to_owned()]);
}

#[tokio::test]
async fn test_uncompleted_names_filters_completed() {
    let list = Arc::new(MemoryShoppingList::new());
    list.seed(vec![
        ShoppingListEntry {
            name: "Milk".to_owned(),
            complete: true,
        },
        ShoppingListEntry {
            name: "Bread".to_owned(),
            complete: false,
        },
    ])
    .await;
    let reconciler = ShoppingListReconciler::new(list);

    assert_eq!(
        reconciler.uncompleted_names().await.unwrap(),
        vec!["Bread".to_owned()]
    );
}

#[tokio::test]
async fn test_freshness_walk_suggests_once_per_episode() {
    let list = Arc::new(MemoryShoppingList::new());
    let reconciler = ShoppingListReconciler::new(list.clone());

    let mut doc = InventoryDocument {
        items: vec![
            test_item("Fil", Some("2025-08-20")),   // expired
            test_item("Mjölk", Some("2025-08-25")), // expiring
            test_item("Ris", Some("2030-01-01")),   // fresh
        ],
        waste_log: Vec::new(),
    };

    let first = reconciler
        .suggest_freshness_candidates(&mut doc, today())
        .await
        .unwrap();
    assert_eq!(first, 2);
    assert!(doc.items[0].shopping_list_suggested);
    assert!(doc.items[1].shopping_list_suggested);
    assert!(!doc.items[2].shopping_list_suggested);

    // The second walk finds every candidate already flagged.
    let second = reconciler
        .suggest_freshness_candidates(&mut doc, today())
        .await
        .unwrap();
    assert_eq!(second, 0);
    assert_eq!(list.names().await.len(), 2);
}

#[tokio::test]
async fn test_freshness_walk_flags_even_when_entry_already_listed() {
    let list = Arc::new(MemoryShoppingList::new());
    list.seed(vec![ShoppingListEntry {
        name: "Fil".to_owned(),
        complete: false,
    }])
    .await;
    let reconciler = ShoppingListReconciler::new(list.clone());

    let mut doc = InventoryDocument {
        items: vec![test_item("Fil", Some("2025-08-20"))],
        waste_log: Vec::new(),
    };
    let attempted = reconciler
        .suggest_freshness_candidates(&mut doc, today())
        .await
        .unwrap();

    // The attempt counts and the flag is set, but the list stays deduplicated.
    assert_eq!(attempted, 1);
    assert!(doc.items[0].shopping_list_suggested);
    assert_eq!(list.names().await.len(), 1);
}

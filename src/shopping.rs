// ABOUTME: Shopping-list reconciliation against the externally owned list
// ABOUTME: Case-insensitive dedup insertion, completed-entry cleanup and the daily freshness walk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Shopping List Reconciler
//!
//! The list itself belongs to the host; the reconciler only reads it and
//! appends or removes named entries. Deduplication is case-insensitive and
//! only considers uncompleted entries, so a checked-off "Milk" does not block
//! a fresh "milk" from being suggested again.

use tracing::{debug, info};

use crate::errors::AppResult;
use crate::host::ShoppingList;
use crate::models::InventoryDocument;
use crate::stats;
use chrono::NaiveDate;
use std::sync::Arc;

/// Reconciles inventory state with the external shopping list
pub struct ShoppingListReconciler {
    list: Arc<dyn ShoppingList>,
}

impl ShoppingListReconciler {
    /// Create a reconciler over the given external list
    pub fn new(list: Arc<dyn ShoppingList>) -> Self {
        Self { list }
    }

    /// Insert `name` unless an uncompleted entry with the same
    /// case-insensitive name already exists. Returns whether an entry was
    /// inserted.
    pub async fn add_if_absent(&self, name: &str) -> AppResult<bool> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(false);
        }

        let entries = self.list.entries().await?;
        let present = entries
            .iter()
            .any(|e| !e.complete && e.name.trim().to_lowercase() == needle);

        if present {
            debug!(name, "already on shopping list, skipping");
            return Ok(false);
        }

        self.list.add_item(name.trim()).await?;
        info!(name, "added to shopping list");
        Ok(true)
    }

    /// The names of all uncompleted entries, in list order.
    pub async fn uncompleted_names(&self) -> AppResult<Vec<String>> {
        let entries = self.list.entries().await?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.complete)
            .map(|e| e.name)
            .collect())
    }

    /// Remove every entry flagged complete, leaving incomplete entries
    /// untouched. Returns the number of removed entries.
    pub async fn clear_completed(&self) -> AppResult<usize> {
        let entries = self.list.entries().await?;
        let mut removed = 0;
        for entry in entries.iter().filter(|e| e.complete) {
            self.list.remove_item(&entry.name).await?;
            removed += 1;
        }
        if removed > 0 {
            info!(removed, "cleared completed shopping list entries");
        }
        Ok(removed)
    }

    /// Daily freshness walk: insert every expired or expiring item whose
    /// `shopping_list_suggested` flag is still false, then set the flag.
    ///
    /// Guarantees at most one automatic insertion attempt per item per
    /// freshness episode; the flag resets when the item's expiry changes or
    /// its quantity is replenished. Returns the number of insertion attempts
    /// made (the document must be persisted by the caller when > 0).
    pub async fn suggest_freshness_candidates(
        &self,
        doc: &mut InventoryDocument,
        today: NaiveDate,
    ) -> AppResult<usize> {
        let candidate_ids: Vec<_> = {
            let stats = stats::classify(&doc.items, today);
            stats
                .expired
                .iter()
                .chain(stats.expiring_soon.iter())
                .filter(|item| !item.shopping_list_suggested)
                .map(|item| item.id)
                .collect()
        };

        let mut attempted = 0;
        for id in candidate_ids {
            if let Some(item) = doc.items.iter_mut().find(|i| i.id == id) {
                self.add_if_absent(&item.name).await?;
                item.shopping_list_suggested = true;
                attempted += 1;
            }
        }
        Ok(attempted)
    }
}

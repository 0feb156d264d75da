// ABOUTME: Pure classification of inventory items into freshness and stock buckets
// ABOUTME: Implements the expired / expiring-soon / low-stock rules against a reference date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Stats Engine
//!
//! `classify` is a pure function of `(items, today)`:
//!
//! - expired: expiry date strictly before `today`
//! - expiring soon: expiry date in `[today, today + 2]` inclusive
//! - low stock: `min_quantity > 0 && quantity <= min_quantity`, independent
//!   of the date buckets
//!
//! Items without an expiry date, or with one that does not parse, belong to
//! neither date bucket.

use chrono::{Duration, NaiveDate};

use crate::models::InventoryItem;

/// Size of the expiring-soon window in days (inclusive)
pub const EXPIRY_WINDOW_DAYS: i64 = 2;

/// Classification result for one reference date
#[derive(Debug, Clone)]
pub struct InventoryStats<'a> {
    /// Total number of active items
    pub total: usize,
    /// Items expiring within the window, `[today, today + 2]`
    pub expiring_soon: Vec<&'a InventoryItem>,
    /// Items whose expiry date has passed
    pub expired: Vec<&'a InventoryItem>,
    /// Items at or below their configured minimum quantity
    pub low_stock: Vec<&'a InventoryItem>,
}

impl InventoryStats<'_> {
    /// Whether both freshness buckets are empty
    pub fn is_all_fresh(&self) -> bool {
        self.expiring_soon.is_empty() && self.expired.is_empty()
    }
}

/// Classify items into freshness and stock buckets for the given date.
pub fn classify(items: &[InventoryItem], today: NaiveDate) -> InventoryStats<'_> {
    let window_end = today + Duration::days(EXPIRY_WINDOW_DAYS);

    let mut expiring_soon = Vec::new();
    let mut expired = Vec::new();
    let mut low_stock = Vec::new();

    for item in items {
        if let Some(expiry) = item.parsed_expiry() {
            if expiry < today {
                expired.push(item);
            } else if expiry <= window_end {
                expiring_soon.push(item);
            }
        }

        if item.is_low_stock() {
            low_stock.push(item);
        }
    }

    InventoryStats {
        total: items.len(),
        expiring_soon,
        expired,
        low_stock,
    }
}

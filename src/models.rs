// ABOUTME: Core data structures for inventory items, waste log and external documents
// ABOUTME: Defines the persisted JSON schema and the shapes exchanged with host collaborators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Data Model
//!
//! The inventory document is a flat JSON object `{ items, waste_log }` and is
//! the single source of truth for the tracker. Calendar dates are stored as
//! `YYYY-MM-DD` strings; expiry dates deliberately stay `Option<String>` in
//! the schema so a malformed value degrades an item out of the date buckets
//! instead of failing the whole document load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage location of an inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Refrigerator (default)
    #[default]
    Fridge,
    /// Freezer
    Freezer,
    /// Dry storage / pantry
    Pantry,
}

impl Location {
    /// String representation matching the persisted schema
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fridge => "fridge",
            Self::Freezer => "freezer",
            Self::Pantry => "pantry",
        }
    }

    /// Parse from string with fallback to the default location
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "freezer" => Self::Freezer,
            "pantry" => Self::Pantry,
            _ => Self::Fridge,
        }
    }
}

/// A single tracked grocery item
///
/// Invariant: an item with `quantity <= 0` never remains in the active
/// collection; it is merged away or deleted by the operation that drained it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Opaque unique identifier, generated at creation
    pub id: Uuid,
    /// Barcode; empty string for manually entered items
    #[serde(default)]
    pub barcode: String,
    /// Product name
    pub name: String,
    /// Product category (free-form, from barcode lookup or manual entry)
    #[serde(default)]
    pub category: String,
    /// Number of units on hand
    pub quantity: i64,
    /// Unit label ("st" = pieces)
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Date the item was first added
    pub added_date: NaiveDate,
    /// Best-before date as `YYYY-MM-DD`, if known
    #[serde(default)]
    pub expiry_date: Option<String>,
    /// Entry source tag (`mobile`, `manual`, ...)
    #[serde(default)]
    pub source: String,
    /// Product image URL from barcode lookup
    #[serde(default)]
    pub image_url: String,
    /// Guard against repeated automatic shopping-list insertion; reset
    /// whenever quantity or expiry changes
    #[serde(default)]
    pub shopping_list_suggested: bool,
    /// Low-stock threshold; 0 disables low-stock tracking
    #[serde(default)]
    pub min_quantity: i64,
    /// Where the item is stored
    #[serde(default)]
    pub location: Location,
}

fn default_unit() -> String {
    "st".to_owned()
}

impl InventoryItem {
    /// Create a new item with a fresh identifier
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        barcode: &str,
        name: &str,
        quantity: i64,
        unit: &str,
        expiry_date: Option<String>,
        category: &str,
        source: &str,
        image_url: &str,
        added_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            barcode: barcode.to_owned(),
            name: name.to_owned(),
            category: category.to_owned(),
            quantity,
            unit: unit.to_owned(),
            added_date,
            expiry_date,
            source: source.to_owned(),
            image_url: image_url.to_owned(),
            shopping_list_suggested: false,
            min_quantity: 0,
            location: Location::Fridge,
        }
    }

    /// Parse the expiry date, treating malformed strings as absent
    pub fn parsed_expiry(&self) -> Option<NaiveDate> {
        self.expiry_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    /// Whether the item is below its configured minimum stock level
    pub fn is_low_stock(&self) -> bool {
        self.min_quantity > 0 && self.quantity <= self.min_quantity
    }
}

/// Origin of a waste-log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteSource {
    /// Removed via barcode scan
    ScanRemove,
    /// Removed via explicit item-id deletion
    ManualRemove,
    /// Scan of a barcode with no matching inventory item
    UnknownRemoved,
}

/// One removed unit, recorded for waste statistics
///
/// The waste log is append-only; entries are never mutated or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteEntry {
    /// Date the unit was removed
    pub date: NaiveDate,
    /// Item name at removal time (best-effort for unknown barcodes)
    pub name: String,
    /// Barcode, empty for manual entries
    #[serde(default)]
    pub barcode: String,
    /// How the removal happened
    pub source: WasteSource,
}

/// Number of waste-log entries exposed to consumers
pub const WASTE_LOG_DISPLAY_LIMIT: usize = 100;

/// The persisted inventory document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDocument {
    /// Active inventory items
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    /// Append-only waste log
    #[serde(default)]
    pub waste_log: Vec<WasteEntry>,
}

impl InventoryDocument {
    /// The most recent waste-log entries, newest last
    pub fn recent_waste(&self) -> &[WasteEntry] {
        let start = self.waste_log.len().saturating_sub(WASTE_LOG_DISPLAY_LIMIT);
        &self.waste_log[start..]
    }
}

/// One entry of the externally owned shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    /// Item name
    pub name: String,
    /// Whether the entry has been checked off
    #[serde(default)]
    pub complete: bool,
}

/// Product metadata resolved from a barcode lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductInfo {
    /// Product name (may be empty when the lookup had no usable name)
    pub name: String,
    /// Product category
    pub category: String,
    /// Small product image URL
    pub image_url: String,
}

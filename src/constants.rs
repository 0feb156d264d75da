// ABOUTME: Shared constants for sensor entity ids and notification identity
// ABOUTME: Central place for the names the tracker publishes to the host
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

/// Notification id shared by all tracker actions so newer messages replace
/// older ones instead of stacking up
pub const NOTIFICATION_ID: &str = "grocery_action";

/// Published sensor entity ids
pub mod sensors {
    /// Total number of active items
    pub const TOTAL_ITEMS: &str = "sensor.grocery_total_items";
    /// Items expiring within two days
    pub const EXPIRING_SOON: &str = "sensor.grocery_expiring_soon";
    /// Items past their expiry date
    pub const EXPIRED: &str = "sensor.grocery_expired";
    /// Items at or below their minimum quantity
    pub const LOW_STOCK: &str = "sensor.grocery_low_stock";
    /// Waste log length with the recent entries as attribute
    pub const WASTE_LOG: &str = "sensor.grocery_waste_log";
    /// Last generated recipe with parsed energy metadata
    pub const LAST_RECIPE: &str = "sensor.grocery_last_recipe";
}

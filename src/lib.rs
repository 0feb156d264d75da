// ABOUTME: Main library entry point for the grocery tracker daemon
// ABOUTME: Household inventory, expiry tracking, shopping list and recipe suggestions for Home Assistant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

#![deny(unsafe_code)]

//! # Grocery Tracker
//!
//! A household grocery inventory daemon for Home Assistant. Items enter the
//! inventory by barcode scan or manual entry, live in a flat JSON document,
//! and flow out through removals that feed a waste log. Derived freshness
//! and stock statistics are published as host sensors.
//!
//! ## Features
//!
//! - **Barcode scanning**: product metadata resolved via Open Food Facts
//! - **Expiry tracking**: expired / expiring-soon classification with a
//!   daily fridge report
//! - **Shopping list**: deduplicated suggestions into the host's list
//! - **Recipe suggestions**: multi-provider fallback chain (`OpenAI`, Groq,
//!   Gemini, host conversation agent) with cooking-energy estimates
//! - **Cooking sessions**: meter-backed energy and cost measurement
//!
//! ## Architecture
//!
//! - **Models / Store**: the persisted inventory document
//! - **Stats**: pure freshness and stock classification
//! - **Host**: trait-based Home Assistant integration (states,
//!   notifications, shopping list, conversation)
//! - **Llm**: recipe provider abstraction and fallback chain
//! - **Tracker**: the operation-surface facade every entry point goes through
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use grocery_tracker::config::TrackerConfig;
//! use grocery_tracker::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = TrackerConfig::from_env()?;
//!     println!(
//!         "daily review at {:02}:{:02}",
//!         config.daily_review_hour, config.daily_review_minute
//!     );
//!     Ok(())
//! }
//! ```

/// Environment-based configuration
pub mod config;
/// Shared sensor and notification identifiers
pub mod constants;
/// Cooking session energy metering
pub mod cooking;
/// Unified error types and error codes
pub mod errors;
/// Host automation platform traits and the Home Assistant client
pub mod host;
/// Recipe generation providers and the fallback chain
pub mod llm;
/// Logging initialization
pub mod logging;
/// Barcode to product metadata lookup
pub mod lookup;
/// Core data structures
pub mod models;
/// Daily review orchestration
pub mod review;
/// Wall-clock daily scheduling
pub mod schedule;
/// Shopping-list reconciliation
pub mod shopping;
/// Freshness and stock classification
pub mod stats;
/// Inventory document persistence
pub mod store;
/// In-memory fakes for tests
pub mod test_utils;
/// The grocery tracker facade
pub mod tracker;

// ABOUTME: Configuration module for the grocery tracker
// ABOUTME: Re-exports the environment-based tracker configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

/// Environment-variable driven configuration
pub mod environment;

pub use environment::TrackerConfig;

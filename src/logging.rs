// ABOUTME: Logging setup for the tracker daemon
// ABOUTME: Initializes a tracing subscriber with env-filter based level control
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! Structured logging initialization.
//!
//! Log levels are controlled with `RUST_LOG` (env-filter syntax); the
//! default filter keeps the crate at `info` and quiets chatty HTTP internals.

use tracing_subscriber::{fmt, EnvFilter};

/// Default env-filter applied when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Initialize the global tracing subscriber.
///
/// Safe to call once at daemon startup; later calls are ignored so tests
/// that initialize logging do not panic.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

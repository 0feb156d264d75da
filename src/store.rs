// ABOUTME: Flat-file JSON persistence for the inventory document
// ABOUTME: Implements the silent-recovery load policy and whole-document save
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Inventory Store
//!
//! The backing resource is one JSON file. `load` never fails: a missing or
//! corrupt file yields an empty document so the tracker keeps working from a
//! cold or damaged state. Corruption of an existing file is logged at `warn`
//! so data loss can be told apart from first-run in the logs, while the
//! return contract stays the same.
//!
//! The store is the only writer of the file. Callers must treat
//! load → mutate → save as one logical unit and hold the tracker's document
//! lock across it.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::models::InventoryDocument;

/// JSON-file backed inventory store
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the inventory document.
    ///
    /// Missing file and parse failures both resolve to an empty document.
    pub async fn load(&self) -> InventoryDocument {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "inventory file not readable, starting empty");
                return InventoryDocument::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "inventory file exists but failed to parse, starting empty"
                );
                InventoryDocument::default()
            }
        }
    }

    /// Serialize and overwrite the full document.
    pub async fn save(&self, doc: &InventoryDocument) -> AppResult<()> {
        let text = serde_json::to_string_pretty(doc)
            .map_err(|e| AppError::storage(format!("serialize inventory: {e}")))?;

        fs::write(&self.path, text).await.map_err(|e| {
            AppError::storage(format!(
                "write inventory to {}: {e}",
                self.path.display()
            ))
        })
    }
}

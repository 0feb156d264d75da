// ABOUTME: Daily review orchestration on top of the tracker facade
// ABOUTME: Runs the freshness pass, formats the Swedish fridge report and triggers recipe suggestions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Daily Review
//!
//! The scheduled review composes existing pieces: the tracker's freshness
//! pass (classification, shopping-list reconciliation, sensor publication),
//! then a push notification summarizing the fridge, then a recipe suggestion
//! when anything is about to expire. When everything is fresh the review
//! stays silent.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppResult;
use crate::host::Notifier;
use crate::tracker::{DailyDigest, DigestItem, GroceryTracker};

/// Runs the scheduled daily review
pub struct DailyReviewOrchestrator {
    tracker: Arc<GroceryTracker>,
    notifier: Arc<dyn Notifier>,
}

impl DailyReviewOrchestrator {
    /// Create an orchestrator over the tracker
    pub fn new(tracker: Arc<GroceryTracker>, notifier: Arc<dyn Notifier>) -> Self {
        Self { tracker, notifier }
    }

    /// Startup pass: reload the document and republish sensors so the host
    /// shows current values immediately after a restart.
    pub async fn on_start(&self) -> AppResult<()> {
        self.tracker.refresh().await
    }

    /// The daily review: freshness pass, fridge report, recipe suggestion.
    pub async fn run(&self) -> AppResult<()> {
        let digest = self.tracker.freshness_pass().await?;

        if digest.is_empty() {
            info!("daily review: all items fresh, staying silent");
            return Ok(());
        }

        let message = format_report(&digest);
        if let Err(e) = self.notifier.push("🍽️ Kylskåpsrapporten", &message).await {
            warn!("daily report notification failed: {e}");
        }

        if !digest.expiring.is_empty() {
            self.tracker.suggest_recipes(None).await?;
        }
        Ok(())
    }
}

/// Format the fridge report body
fn format_report(digest: &DailyDigest) -> String {
    let mut lines = Vec::new();

    if !digest.expired.is_empty() {
        lines.push("🔴 Utgångna:".to_owned());
        lines.extend(digest.expired.iter().map(bullet_line));
    }

    if !digest.expiring.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("🟡 Går ut snart:".to_owned());
        lines.extend(digest.expiring.iter().map(bullet_line));
    }

    if !digest.inventory.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("📦 I lager:".to_owned());
        lines.push(
            digest
                .inventory
                .iter()
                .map(|i| format!("{} ({} {})", i.name, i.quantity, i.unit))
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    lines.join("\n")
}

fn bullet_line(item: &DigestItem) -> String {
    match &item.expiry_date {
        Some(date) => format!("• {} ({date})", item.name),
        None => format!("• {}", item.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_item(name: &str, expiry: Option<&str>) -> DigestItem {
        DigestItem {
            name: name.to_owned(),
            expiry_date: expiry.map(str::to_owned),
            quantity: 1,
            unit: "st".to_owned(),
        }
    }

    #[test]
    fn test_report_sections_in_order() {
        let digest = DailyDigest {
            expired: vec![digest_item("Fil", Some("2025-08-20"))],
            expiring: vec![digest_item("Mjölk", Some("2025-08-25"))],
            inventory: vec![digest_item("Mjölk", None), digest_item("Ris", None)],
            suggested: 2,
        };
        let report = format_report(&digest);

        let expired_pos = report.find("🔴 Utgångna:").unwrap();
        let expiring_pos = report.find("🟡 Går ut snart:").unwrap();
        let larder_pos = report.find("📦 I lager:").unwrap();
        assert!(expired_pos < expiring_pos && expiring_pos < larder_pos);
        assert!(report.contains("• Fil (2025-08-20)"));
        assert!(report.contains("Mjölk (1 st), Ris (1 st)"));
    }

    #[test]
    fn test_report_without_expired_section() {
        let digest = DailyDigest {
            expired: Vec::new(),
            expiring: vec![digest_item("Mjölk", None)],
            inventory: vec![digest_item("Mjölk", None)],
            suggested: 1,
        };
        let report = format_report(&digest);
        assert!(!report.contains("🔴"));
        assert!(report.starts_with("🟡 Går ut snart:"));
        assert!(report.contains("• Mjölk"));
    }
}

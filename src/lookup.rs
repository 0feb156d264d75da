// ABOUTME: Barcode to product metadata lookup via the Open Food Facts API
// ABOUTME: Best-effort resolution of name, category and image; failures degrade to None
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Product Lookup
//!
//! Scan operations resolve a barcode to product metadata through
//! Open Food Facts. The lookup is strictly best-effort: any transport,
//! status or parse failure is logged and becomes `None`, never an error to
//! the caller. Swedish product names are preferred when available.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::ProductInfo;

/// Request timeout for the lookup service
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URL of the Open Food Facts product API
const API_BASE_URL: &str = "https://world.openfoodfacts.org/api/v2/product";

/// User agent requested by the Open Food Facts API guidelines
const USER_AGENT: &str = "GroceryTracker/0.3 (home automation)";

/// Barcode to product metadata resolution
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Resolve a barcode; `None` when the product is unknown or the lookup failed
    async fn lookup(&self, barcode: &str) -> Option<ProductInfo>;
}

/// Open Food Facts HTTP client
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl Default for OpenFoodFactsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenFoodFactsClient {
    /// Create a client against the public Open Food Facts API
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE_URL.to_owned(),
        }
    }
}

/// Extract product fields from an Open Food Facts response body.
///
/// Name preference order: `product_name_sv`, `product_name`,
/// `product_name_en`. The category is the last `categories_tags` entry with
/// its `en:` prefix stripped and dashes spaced.
fn parse_product(body: &Value) -> Option<ProductInfo> {
    if body.get("status").and_then(Value::as_i64) != Some(1) {
        return None;
    }
    let product = body.get("product")?;

    let name = ["product_name_sv", "product_name", "product_name_en"]
        .iter()
        .find_map(|key| product.get(*key).and_then(Value::as_str))
        .unwrap_or("")
        .trim()
        .to_owned();

    let category = product
        .get("categories_tags")
        .and_then(Value::as_array)
        .and_then(|tags| tags.last())
        .and_then(Value::as_str)
        .map(|tag| tag.trim_start_matches("en:").replace('-', " "))
        .unwrap_or_default();

    let image_url = product
        .get("image_small_url")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();

    Some(ProductInfo {
        name,
        category,
        image_url,
    })
}

#[async_trait]
impl ProductLookup for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> Option<ProductInfo> {
        let url = format!("{}/{barcode}.json", self.base_url);

        let response = match self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(barcode, error = %e, "product lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(barcode, status = %response.status(), "product lookup returned non-success");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(barcode, error = %e, "product lookup body unreadable");
                return None;
            }
        };

        parse_product(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_swedish_name() {
        let body = json!({
            "status": 1,
            "product": {
                "product_name": "Milk",
                "product_name_sv": "Mjölk",
                "categories_tags": ["en:dairies", "en:milks", "en:semi-skimmed-milks"],
                "image_small_url": "https://images.example/milk.jpg"
            }
        });
        let info = parse_product(&body).unwrap();
        assert_eq!(info.name, "Mjölk");
        assert_eq!(info.category, "semi skimmed milks");
        assert_eq!(info.image_url, "https://images.example/milk.jpg");
    }

    #[test]
    fn test_unknown_product_status() {
        let body = json!({ "status": 0, "status_verbose": "product not found" });
        assert!(parse_product(&body).is_none());
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let body = json!({ "status": 1, "product": {} });
        let info = parse_product(&body).unwrap();
        assert!(info.name.is_empty());
        assert!(info.category.is_empty());
        assert!(info.image_url.is_empty());
    }
}

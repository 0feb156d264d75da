// ABOUTME: Daemon entry point wiring configuration, host client and tracker
// ABOUTME: Runs the startup refresh and the daily review loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

use grocery_tracker::config::TrackerConfig;
use grocery_tracker::cooking::CookingSessionTracker;
use grocery_tracker::host::{ConversationAgent, HomeAssistantClient};
use grocery_tracker::llm::FallbackChain;
use grocery_tracker::logging;
use grocery_tracker::lookup::OpenFoodFactsClient;
use grocery_tracker::review::DailyReviewOrchestrator;
use grocery_tracker::schedule;
use grocery_tracker::store::InventoryStore;
use grocery_tracker::tracker::GroceryTracker;

#[derive(Parser)]
#[command(name = "grocery-tracker", about = "Household grocery inventory daemon")]
struct Args {
    /// Run one daily review immediately and exit
    #[arg(long)]
    review_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let config = TrackerConfig::from_env()?;

    let hass = Arc::new(HomeAssistantClient::new(
        &config.hass_base_url,
        &config.hass_token,
        &config.notify_service,
    )?);

    let cooking = CookingSessionTracker::new(
        hass.clone(),
        hass.clone(),
        &config.meter_entity,
        &config.price_entity,
    );
    let chain = FallbackChain::from_config(
        &config,
        hass.clone() as Arc<dyn ConversationAgent>,
    );
    let tracker = Arc::new(GroceryTracker::new(
        InventoryStore::new(&config.inventory_path),
        hass.clone(),
        hass.clone(),
        hass.clone(),
        Arc::new(OpenFoodFactsClient::new()),
        chain,
        cooking,
        &config.price_entity,
    ));
    let review = DailyReviewOrchestrator::new(tracker, hass);

    if args.review_once {
        review.run().await?;
        return Ok(());
    }

    info!(
        "grocery tracker started, daily review at {:02}:{:02}",
        config.daily_review_hour, config.daily_review_minute
    );
    review.on_start().await?;

    loop {
        let pause = schedule::sleep_until_next(
            Local::now(),
            config.daily_review_hour,
            config.daily_review_minute,
        );
        info!(seconds = pause.as_secs(), "sleeping until next daily review");
        tokio::time::sleep(pause).await;

        if let Err(e) = review.run().await {
            error!("daily review failed: {e}");
        }
    }
}

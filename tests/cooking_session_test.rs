// ABOUTME: Integration tests for cooking session energy metering
// ABOUTME: Covers baseline/delta pricing, meter resets and unavailable readings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;

use grocery_tracker::cooking::CookingSessionTracker;
use grocery_tracker::test_utils::{MemoryStates, RecordingNotifier};

const METER: &str = "sensor.household_energy";
const PRICE: &str = "sensor.electricity_price";
const ACTIVE: &str = "sensor.cooking_session_active";
const ENERGY: &str = "sensor.cooking_energy_used";
const COST: &str = "sensor.cooking_energy_cost";

fn tracker() -> (CookingSessionTracker, Arc<MemoryStates>, Arc<RecordingNotifier>) {
    let states = Arc::new(MemoryStates::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let tracker = CookingSessionTracker::new(states.clone(), notifier.clone(), METER, PRICE);
    (tracker, states, notifier)
}

#[tokio::test]
async fn test_full_session_publishes_energy_and_cost() {
    let (tracker, states, _) = tracker();
    states.set_numeric(METER, Some(10.0)).await;
    states.set_numeric(PRICE, Some(2.0)).await;

    tracker.start().await.unwrap();
    assert!(tracker.is_active().await);
    assert_eq!(states.state_of(ACTIVE).await.as_deref(), Some("on"));
    assert_eq!(states.state_of(ENERGY).await.as_deref(), Some("unknown"));

    states.set_numeric(METER, Some(12.5)).await;
    tracker.stop().await.unwrap();

    assert!(!tracker.is_active().await);
    assert_eq!(states.state_of(ACTIVE).await.as_deref(), Some("off"));
    assert_eq!(states.state_of(ENERGY).await.as_deref(), Some("2.500"));
    assert_eq!(states.state_of(COST).await.as_deref(), Some("5.00"));
}

#[tokio::test]
async fn test_start_with_unavailable_meter_does_not_open_session() {
    let (tracker, states, notifier) = tracker();
    states.set_numeric(METER, None).await;

    tracker.start().await.unwrap();

    assert!(!tracker.is_active().await);
    assert!(states.state_of(ACTIVE).await.is_none());
    assert!(notifier
        .persistent_messages()
        .await
        .iter()
        .any(|(title, _, _)| title.contains("Energimätare otillgänglig")));
}

#[tokio::test]
async fn test_meter_reset_aborts_cost_calculation() {
    let (tracker, states, notifier) = tracker();
    states.set_numeric(METER, Some(10.0)).await;

    tracker.start().await.unwrap();
    states.set_numeric(METER, Some(8.0)).await;
    tracker.stop().await.unwrap();

    // The active flag clears, but no wrapped or negative figure is published.
    assert_eq!(states.state_of(ACTIVE).await.as_deref(), Some("off"));
    assert_eq!(states.state_of(ENERGY).await.as_deref(), Some("unknown"));
    assert_eq!(states.state_of(COST).await.as_deref(), Some("unknown"));
    assert!(notifier
        .persistent_messages()
        .await
        .iter()
        .any(|(title, _, _)| title.contains("Mätaren nollställdes")));
}

#[tokio::test]
async fn test_stop_without_session_notifies() {
    let (tracker, states, notifier) = tracker();

    tracker.stop().await.unwrap();

    assert_eq!(states.state_of(ACTIVE).await.as_deref(), Some("off"));
    assert!(notifier
        .persistent_messages()
        .await
        .iter()
        .any(|(title, _, _)| title.contains("Ingen aktiv session")));
}

#[tokio::test]
async fn test_missing_price_still_publishes_energy() {
    let (tracker, states, _) = tracker();
    states.set_numeric(METER, Some(5.0)).await;
    states.set_numeric(PRICE, None).await;

    tracker.start().await.unwrap();
    states.set_numeric(METER, Some(5.75)).await;
    tracker.stop().await.unwrap();

    assert_eq!(states.state_of(ENERGY).await.as_deref(), Some("0.750"));
    assert_eq!(states.state_of(COST).await.as_deref(), Some("unknown"));
}

// ABOUTME: Cooking session tracking against the household smart meter
// ABOUTME: Brackets one cooking event between start/stop meter readings and prices the delta
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Cooking Session Tracker
//!
//! A session brackets one cooking event: `start` records the cumulative
//! meter reading as baseline, `stop` prices the consumed delta. Sessions are
//! ephemeral in-memory state; a process restart drops any active session.
//!
//! A negative delta means the meter reset between start and stop (daily
//! rollover). The calculation is aborted and reported instead of publishing
//! a wrapped or negative figure; previously published consumption values
//! stay untouched. The active flag is always cleared on stop.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::AppResult;
use crate::host::{HostStates, Notifier};
use crate::constants;

/// Entity reporting whether a session is running
const SENSOR_SESSION_ACTIVE: &str = "sensor.cooking_session_active";
/// Entity for the measured energy of the last finished session
const SENSOR_ENERGY_USED: &str = "sensor.cooking_energy_used";
/// Entity for the priced cost of the last finished session
const SENSOR_ENERGY_COST: &str = "sensor.cooking_energy_cost";

/// One active session
#[derive(Debug, Clone, Copy)]
struct CookingSession {
    baseline_kwh: f64,
}

/// Start/stop energy metering around a cooking event
pub struct CookingSessionTracker {
    states: Arc<dyn HostStates>,
    notifier: Arc<dyn Notifier>,
    meter_entity: String,
    price_entity: String,
    session: Mutex<Option<CookingSession>>,
}

impl CookingSessionTracker {
    /// Create a tracker reading the given meter and price entities
    pub fn new(
        states: Arc<dyn HostStates>,
        notifier: Arc<dyn Notifier>,
        meter_entity: &str,
        price_entity: &str,
    ) -> Self {
        Self {
            states,
            notifier,
            meter_entity: meter_entity.to_owned(),
            price_entity: price_entity.to_owned(),
            session: Mutex::new(None),
        }
    }

    /// Whether a session is currently active
    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Start a session: record the meter baseline and reset the previous
    /// actual-consumption sensors.
    pub async fn start(&self) -> AppResult<()> {
        let Some(reading) = self.states.numeric_state(&self.meter_entity).await? else {
            warn!(entity = %self.meter_entity, "meter unavailable, not starting session");
            self.notifier
                .persistent(
                    "⚡ Energimätare otillgänglig",
                    "Kunde inte läsa mätarställningen, ingen matlagningssession startad.",
                    constants::NOTIFICATION_ID,
                )
                .await?;
            return Ok(());
        };

        let mut session = self.session.lock().await;
        *session = Some(CookingSession {
            baseline_kwh: reading,
        });

        self.states
            .set_state(SENSOR_ENERGY_USED, "unknown", json!({}))
            .await?;
        self.states
            .set_state(SENSOR_ENERGY_COST, "unknown", json!({}))
            .await?;
        self.publish_active(true).await?;

        info!(baseline = reading, "cooking session started");
        Ok(())
    }

    /// Stop the session and price the consumed delta.
    ///
    /// The active flag is cleared regardless of outcome. A negative delta
    /// aborts the calculation and leaves the previous consumption sensors
    /// untouched.
    pub async fn stop(&self) -> AppResult<()> {
        let previous = { self.session.lock().await.take() };
        self.publish_active(false).await?;

        let Some(active) = previous else {
            self.notifier
                .persistent(
                    "🍳 Ingen aktiv session",
                    "Det finns ingen pågående matlagningssession att avsluta.",
                    constants::NOTIFICATION_ID,
                )
                .await?;
            return Ok(());
        };

        let Some(reading) = self.states.numeric_state(&self.meter_entity).await? else {
            warn!(entity = %self.meter_entity, "meter unavailable on stop");
            self.notifier
                .persistent(
                    "⚡ Energimätare otillgänglig",
                    "Kunde inte läsa mätarställningen vid stopp; ingen förbrukning beräknad.",
                    constants::NOTIFICATION_ID,
                )
                .await?;
            return Ok(());
        };

        let delta = reading - active.baseline_kwh;
        if delta < 0.0 {
            warn!(
                baseline = active.baseline_kwh,
                reading, "meter reset during session, aborting cost calculation"
            );
            self.notifier
                .persistent(
                    "⚡ Mätaren nollställdes",
                    "Mätarställningen är lägre än vid start (trolig dygnsnollställning); \
                     förbrukningen kan inte beräknas.",
                    constants::NOTIFICATION_ID,
                )
                .await?;
            return Ok(());
        }

        self.states
            .set_state(
                SENSOR_ENERGY_USED,
                &format!("{delta:.3}"),
                json!({
                    "friendly_name": "Matlagning energi",
                    "unit_of_measurement": "kWh",
                    "icon": "mdi:pot-steam",
                }),
            )
            .await?;

        // Price is optional: without it the kWh figure still gets published.
        match self.states.numeric_state(&self.price_entity).await {
            Ok(Some(price)) => {
                let cost = delta * price;
                self.states
                    .set_state(
                        SENSOR_ENERGY_COST,
                        &format!("{cost:.2}"),
                        json!({
                            "friendly_name": "Matlagning kostnad",
                            "unit_of_measurement": "kr",
                            "icon": "mdi:cash",
                            "unit_price": price,
                        }),
                    )
                    .await?;
                info!(kwh = delta, cost, "cooking session finished");
            }
            Ok(None) | Err(_) => {
                warn!(entity = %self.price_entity, "energy price unavailable, cost not published");
                info!(kwh = delta, "cooking session finished without price");
            }
        }

        Ok(())
    }

    async fn publish_active(&self, active: bool) -> AppResult<()> {
        self.states
            .set_state(
                SENSOR_SESSION_ACTIVE,
                if active { "on" } else { "off" },
                json!({ "friendly_name": "Matlagningssession" }),
            )
            .await
    }
}

// ABOUTME: Parses the trailing ENERGY/APPLIANCE annotation out of generated recipe text
// ABOUTME: Converts cooking minutes per appliance into an estimated energy draw and cost
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! # Energy Annotation
//!
//! The recipe prompt asks the provider to end its reply with one line of the
//! form `ENERGY: <minutes>min APPLIANCE: <spis|ugn|mikro>`. When present the
//! annotation is stripped from the displayed text and converted into an
//! estimated energy draw through a fixed wattage table. Absence of the
//! annotation is not an error; cost fields simply stay unset.

use serde::{Deserialize, Serialize};

/// Kitchen appliance named in the annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appliance {
    /// Stove top
    Spis,
    /// Oven
    Ugn,
    /// Microwave
    Mikro,
}

impl Appliance {
    /// Assumed power draw while cooking
    pub const fn watts(self) -> f64 {
        match self {
            Self::Spis => 1500.0,
            Self::Ugn => 2200.0,
            Self::Mikro => 800.0,
        }
    }

    /// Annotation token for this appliance
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spis => "spis",
            Self::Ugn => "ugn",
            Self::Mikro => "mikro",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "spis" => Some(Self::Spis),
            "ugn" => Some(Self::Ugn),
            "mikro" => Some(Self::Mikro),
            _ => None,
        }
    }
}

/// Parsed energy annotation with the derived energy draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    /// Cooking time from the annotation
    pub minutes: u32,
    /// Appliance from the annotation
    pub appliance: Appliance,
    /// Estimated energy draw, `watt / 1000 × minutes / 60`
    pub kwh: f64,
}

impl EnergyEstimate {
    fn new(minutes: u32, appliance: Appliance) -> Self {
        let kwh = appliance.watts() / 1000.0 * f64::from(minutes) / 60.0;
        Self {
            minutes,
            appliance,
            kwh,
        }
    }

    /// Estimated cost at the given unit energy price
    pub fn cost_at(&self, unit_price: f64) -> f64 {
        self.kwh * unit_price
    }
}

/// Scan `text` for a single trailing energy annotation.
///
/// Returns the display text (annotation stripped, trailing whitespace
/// trimmed) and the parsed estimate when the annotation was present and
/// well-formed. A malformed or mid-text annotation leaves the text as-is.
pub fn extract_annotation(text: &str) -> (String, Option<EnergyEstimate>) {
    let Some(idx) = text.rfind("ENERGY:") else {
        return (text.trim().to_owned(), None);
    };

    match parse_annotation(&text[idx..]) {
        Some(estimate) => (text[..idx].trim().to_owned(), Some(estimate)),
        None => (text.trim().to_owned(), None),
    }
}

/// Parse `ENERGY: <minutes>min APPLIANCE: <token>` covering the whole input.
fn parse_annotation(candidate: &str) -> Option<EnergyEstimate> {
    let rest = candidate.strip_prefix("ENERGY:")?.trim_start();

    let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let minutes: u32 = rest[..digits_end].parse().ok()?;

    let rest = rest[digits_end..].trim_start();
    let rest = rest.strip_prefix("min")?.trim_start();
    let rest = rest.strip_prefix("APPLIANCE:")?.trim_start();

    let token_end = rest
        .find(|c: char| !c.is_alphanumeric())
        .unwrap_or(rest.len());
    let appliance = Appliance::from_token(&rest[..token_end])?;

    // The annotation must be trailing: nothing but whitespace/punctuation
    // may follow the appliance token.
    if rest[token_end..]
        .chars()
        .any(|c| c.is_alphanumeric())
    {
        return None;
    }

    Some(EnergyEstimate::new(minutes, appliance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_annotation_is_stripped() {
        let text = "Gör en omelett med svamp.\n\nENERGY: 20min APPLIANCE: spis";
        let (display, estimate) = extract_annotation(text);
        assert_eq!(display, "Gör en omelett med svamp.");

        let estimate = estimate.unwrap();
        assert_eq!(estimate.minutes, 20);
        assert_eq!(estimate.appliance, Appliance::Spis);
        assert!((estimate.kwh - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_annotation_is_not_an_error() {
        let (display, estimate) = extract_annotation("Koka pasta enligt paketet.");
        assert_eq!(display, "Koka pasta enligt paketet.");
        assert!(estimate.is_none());
    }

    #[test]
    fn test_oven_wattage_and_cost() {
        let (_, estimate) = extract_annotation("Ugnsbakad lax.\nENERGY: 30min APPLIANCE: ugn");
        let estimate = estimate.unwrap();
        assert!((estimate.kwh - 1.1).abs() < 1e-9);
        assert!((estimate.cost_at(2.5) - 2.75).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_appliance_keeps_text() {
        let text = "Recept.\nENERGY: 10min APPLIANCE: grill";
        let (display, estimate) = extract_annotation(text);
        assert!(estimate.is_none());
        assert_eq!(display, text.trim());
    }

    #[test]
    fn test_annotation_must_be_trailing() {
        let text = "ENERGY: 10min APPLIANCE: mikro\nSen lite mer text efteråt.";
        let (_, estimate) = extract_annotation(text);
        assert!(estimate.is_none());
    }

    #[test]
    fn test_flexible_spacing() {
        let (_, estimate) = extract_annotation("X\nENERGY:15 min APPLIANCE:mikro");
        let estimate = estimate.unwrap();
        assert_eq!(estimate.minutes, 15);
        assert_eq!(estimate.appliance, Appliance::Mikro);
    }
}

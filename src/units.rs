//! Canonical units for health readings.
//!
//! Every reading carries a [`Unit`] tag. Explicitly tagged readings convert
//! exactly; only [`Unit::Unknown`] readings fall back to magnitude heuristics.
//! Those heuristics are an approximation: a legitimate metric value on the far
//! side of a threshold will be misread.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::HealthField;

pub const HEIGHT_CENTIMETER_THRESHOLD: f64 = 3.0;
pub const WAIST_INCH_THRESHOLD: f64 = 80.0;
pub const WEIGHT_POUND_THRESHOLD: f64 = 200.0;

pub const POUND_TO_KG: f64 = 0.453592;
pub const INCH_TO_CM: f64 = 2.54;
pub const FOOT_TO_M: f64 = 0.3048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Unknown,
    Kilograms,
    Pounds,
    Meters,
    Centimeters,
    Inches,
    Feet,
}

impl Unit {
    pub fn parse_suffix(suffix: &str) -> Option<Self> {
        match suffix.trim().to_ascii_lowercase().as_str() {
            "" => Some(Self::Unknown),
            "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => Some(Self::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Some(Self::Pounds),
            "m" | "meter" | "meters" | "metre" | "metres" => Some(Self::Meters),
            "cm" | "cms" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Some(Self::Centimeters)
            }
            "in" | "inch" | "inches" | "\"" => Some(Self::Inches),
            "ft" | "foot" | "feet" | "'" => Some(Self::Feet),
            _ => None,
        }
    }
}

/// Canonical unit stored in the profile for a unit-bearing field.
pub fn canonical_unit(field: HealthField) -> Option<Unit> {
    match field {
        HealthField::Weight => Some(Unit::Kilograms),
        HealthField::Height => Some(Unit::Meters),
        HealthField::Waist => Some(Unit::Centimeters),
        HealthField::Age | HealthField::Gender => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    pub unit: Unit,
}

impl Reading {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn untagged(value: f64) -> Self {
        Self::new(value, Unit::Unknown)
    }

    pub fn canonical(field: HealthField, value: f64) -> Self {
        Self::new(value, canonical_unit(field).unwrap_or(Unit::Unknown))
    }

    pub fn is_canonical_for(&self, field: HealthField) -> bool {
        canonical_unit(field) == Some(self.unit)
    }
}

/// Converts a reading to the canonical unit of `field`.
///
/// Idempotent: a canonical reading is returned unchanged.
pub fn normalize_reading(field: HealthField, reading: Reading) -> Reading {
    let Some(target) = canonical_unit(field) else {
        return reading;
    };
    if reading.unit == target {
        return reading;
    }

    let converted = match (field, reading.unit) {
        (HealthField::Weight, Unit::Pounds) => Some(reading.value * POUND_TO_KG),
        (HealthField::Height, Unit::Centimeters) => Some(reading.value / 100.0),
        (HealthField::Height, Unit::Inches) => Some(reading.value * INCH_TO_CM / 100.0),
        (HealthField::Height, Unit::Feet) => Some(reading.value * FOOT_TO_M),
        (HealthField::Waist, Unit::Inches) => Some(reading.value * INCH_TO_CM),
        (HealthField::Waist, Unit::Meters) => Some(reading.value * 100.0),
        _ => None,
    };

    let value = converted.unwrap_or_else(|| infer_by_magnitude(field, reading.value));
    Reading::new(value, target)
}

fn infer_by_magnitude(field: HealthField, value: f64) -> f64 {
    match field {
        HealthField::Height if value > HEIGHT_CENTIMETER_THRESHOLD => value / 100.0,
        HealthField::Waist if value < WAIST_INCH_THRESHOLD => value * INCH_TO_CM,
        HealthField::Weight if value > WEIGHT_POUND_THRESHOLD => value * POUND_TO_KG,
        _ => value,
    }
}

/// Physiologically possible range for a canonical value.
pub fn plausible_range(field: HealthField) -> Option<(f64, f64)> {
    match field {
        HealthField::Age => Some((1.0, 120.0)),
        HealthField::Weight => Some((2.0, 400.0)),
        HealthField::Height => Some((0.5, 2.6)),
        HealthField::Waist => Some((30.0, 250.0)),
        HealthField::Gender => None,
    }
}

pub fn is_plausible(field: HealthField, canonical_value: f64) -> bool {
    if !canonical_value.is_finite() {
        return false;
    }
    match plausible_range(field) {
        Some((low, high)) => (low..=high).contains(&canonical_value),
        None => true,
    }
}

static QUANTITY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^\s*(-?\d+(?:\.\d+)?)\s*([A-Za-z"']*)\.?\s*$"#).ok()
});

static FEET_AND_INCHES: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^\s*(\d+)\s*(?:'|ft|feet|foot)\s*(\d+(?:\.\d+)?)\s*(?:"|in|inch|inches)?\s*$"#).ok()
});

/// Parses a free-form reading such as `"180 cm"`, `"5'8\""` or `72.5`.
///
/// `hint` is the unit implied by the field key (for example `weight_lbs`);
/// an explicit suffix in the text takes precedence over it.
pub fn parse_reading(value: &serde_json::Value, hint: Option<Unit>) -> Option<Reading> {
    let default_unit = hint.unwrap_or(Unit::Unknown);
    match value {
        serde_json::Value::Number(number) => {
            number.as_f64().map(|value| Reading::new(value, default_unit))
        }
        serde_json::Value::String(text) => parse_reading_text(text, default_unit),
        _ => None,
    }
}

fn parse_reading_text(text: &str, default_unit: Unit) -> Option<Reading> {
    if let Some(captures) = FEET_AND_INCHES.as_ref().and_then(|re| re.captures(text)) {
        let feet: f64 = captures.get(1)?.as_str().parse().ok()?;
        let inches: f64 = captures.get(2)?.as_str().parse().ok()?;
        let meters = feet * FOOT_TO_M + inches * INCH_TO_CM / 100.0;
        return Some(Reading::new(meters, Unit::Meters));
    }

    let captures = QUANTITY.as_ref()?.captures(text)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    let suffix = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
    let unit = match Unit::parse_suffix(suffix)? {
        Unit::Unknown => default_unit,
        explicit => explicit,
    };
    Some(Reading::new(value, unit))
}

/// Parses a plain number that may arrive as a JSON string (`"45"`, `"45 years"`).
pub fn parse_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text
            .split_whitespace()
            .next()
            .and_then(|head| head.parse::<f64>().ok()),
        _ => None,
    }
}

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use crate::{
    diagnosis::state::WorkingVars,
    ports::ExtractedInfo,
    types::{Gender, HealthField},
    units::{self, Reading, Unit},
};

/// Resolves an extractor field key to a canonical field and the unit it implies.
pub fn resolve_field_key(key: &str) -> Option<(HealthField, Option<Unit>)> {
    let key = key.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    let resolved = match key.as_str() {
        "age" | "years" | "age_years" | "years_old" => (HealthField::Age, None),
        "gender" | "sex" => (HealthField::Gender, None),
        "weight" | "body_weight" | "mass" => (HealthField::Weight, None),
        "weight_kg" | "weight_kgs" => (HealthField::Weight, Some(Unit::Kilograms)),
        "weight_lb" | "weight_lbs" | "weight_pounds" => (HealthField::Weight, Some(Unit::Pounds)),
        "height" | "stature" => (HealthField::Height, None),
        "height_m" | "height_meters" => (HealthField::Height, Some(Unit::Meters)),
        "height_cm" => (HealthField::Height, Some(Unit::Centimeters)),
        "height_in" | "height_inches" => (HealthField::Height, Some(Unit::Inches)),
        "height_ft" | "height_feet" => (HealthField::Height, Some(Unit::Feet)),
        "waist" | "waist_size" | "waist_circumference" => (HealthField::Waist, None),
        "waist_cm" | "waist_circumference_cm" => (HealthField::Waist, Some(Unit::Centimeters)),
        "waist_in" | "waist_inches" => (HealthField::Waist, Some(Unit::Inches)),
        _ => return None,
    };
    Some(resolved)
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(text) => {
            let text = text.trim();
            text.is_empty() || text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("none")
        }
        _ => false,
    }
}

/// Overwrites working fields with newly stated values; unparseable values are ignored.
pub fn merge_vars(vars: &mut WorkingVars, extracted: &ExtractedInfo) {
    for (key, value) in &extracted.vars {
        if is_blank(value) {
            continue;
        }
        let Some((field, hint)) = resolve_field_key(key) else {
            tracing::debug!(target: "diagnosis", key = %key, "unknown_field_ignored");
            continue;
        };
        match field {
            HealthField::Age => {
                if let Some(age) = units::parse_number(value) {
                    vars.age = Some(age);
                }
            }
            HealthField::Gender => {
                if let Some(gender) = value.as_str().and_then(Gender::parse) {
                    vars.gender = Some(gender);
                }
            }
            HealthField::Weight | HealthField::Height | HealthField::Waist => {
                let Some(reading) = units::parse_reading(value, hint) else {
                    continue;
                };
                if echoes_canonical(vars.reading(field), field, reading) {
                    continue;
                }
                vars.set_reading(field, Some(reading));
            }
        }
    }
}

/// A unit-less number equal to the stored canonical value is that value repeated back.
fn echoes_canonical(current: Option<Reading>, field: HealthField, reading: Reading) -> bool {
    reading.unit == Unit::Unknown
        && current.is_some_and(|current| {
            current.is_canonical_for(field) && (current.value - reading.value).abs() < 1e-9
        })
}

static SIZED_BODY_PART: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"\b(stubborn|substantial|big|large|small|thin|huge|wide)\s+(waist|weight|belly|size|body)\b",
    )
    .ok()
});

static BODY_MEASURE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(weight|waist|height|size)\b(\s+(loss|gain)\b)?").ok());

/// True for phrases describing body size or shape rather than a symptom.
///
/// Weight loss and weight gain remain symptoms.
pub fn is_body_descriptor(phrase: &str) -> bool {
    let phrase = phrase.to_lowercase();
    if SIZED_BODY_PART
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(&phrase))
    {
        return true;
    }
    BODY_MEASURE.as_ref().is_some_and(|pattern| {
        pattern
            .captures_iter(&phrase)
            .any(|captures| captures.get(2).is_none())
    })
}

/// Appends new symptoms, skipping body descriptors and case-insensitive duplicates.
pub fn merge_symptoms(existing: &mut Vec<String>, mentioned: &[String]) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|s| s.to_lowercase()).collect();
    let mut added = 0;
    for symptom in mentioned {
        let symptom = symptom.trim();
        if symptom.is_empty() || is_body_descriptor(symptom) {
            continue;
        }
        if seen.insert(symptom.to_lowercase()) {
            existing.push(symptom.to_string());
            added += 1;
        }
    }
    added
}

use crate::{
    classifier::guidance::GENERAL_CAPABILITY_SUMMARY,
    ports::{MessageIntent, Tone},
    types::Intent,
};

const NOT_AVAILABLE: &str = "N/A";

pub fn polish_style(intent: Intent) -> (MessageIntent, Tone) {
    match intent {
        Intent::OutOfContext => (MessageIntent::Warn, Tone::Professional),
        Intent::Health | Intent::Nutrition => (MessageIntent::Explain, Tone::Friendly),
        Intent::Followup | Intent::General => (MessageIntent::Guide, Tone::Friendly),
    }
}

fn present(section: Option<&str>) -> Option<&str> {
    section.map(str::trim).filter(|text| !text.is_empty())
}

/// Internal text handed to the polisher.
pub fn compose_source(diagnosis: Option<&str>, nutrition: Option<&str>) -> String {
    format!(
        "DIAGNOSIS:\n{}\n\nNUTRITION:\n{}",
        present(diagnosis).unwrap_or(NOT_AVAILABLE),
        present(nutrition).unwrap_or(NOT_AVAILABLE)
    )
}

/// Reply used when polishing is unavailable.
pub fn unpolished(diagnosis: Option<&str>, nutrition: Option<&str>) -> String {
    let sections: Vec<&str> = [present(diagnosis), present(nutrition)]
        .into_iter()
        .flatten()
        .collect();
    if sections.is_empty() {
        GENERAL_CAPABILITY_SUMMARY.to_string()
    } else {
        sections.join("\n\n")
    }
}

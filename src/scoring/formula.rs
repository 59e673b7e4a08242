//! Pure arithmetic of the symptom risk score.

use std::collections::BTreeSet;

use crate::ports::ConceptKind;

pub const DEFAULT_RELEVANCE: f64 = 0.5;
pub const HIGH_RELEVANCE: f64 = 0.8;

/// Best-weighted concept kept for one symptom.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomMatch {
    pub symptom: String,
    pub concept_id: String,
    pub kind: ConceptKind,
    pub similarity: f64,
    pub relevance: f64,
    pub weighted: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchStats {
    pub avg_weighted: f64,
    pub max_weighted: f64,
    pub num_matches: usize,
    pub num_concepts: usize,
    pub biomarker_count: usize,
    pub symptom_count: usize,
    pub high_relevance_count: usize,
}

impl MatchStats {
    pub fn from_matches(matches: &[SymptomMatch]) -> Option<Self> {
        if matches.is_empty() {
            return None;
        }

        let total: f64 = matches.iter().map(|m| m.weighted).sum();
        let max_weighted = matches
            .iter()
            .map(|m| m.weighted)
            .fold(f64::MIN, f64::max);
        let concepts: BTreeSet<&str> = matches.iter().map(|m| m.concept_id.as_str()).collect();

        Some(Self {
            avg_weighted: total / matches.len() as f64,
            max_weighted,
            num_matches: matches.len(),
            num_concepts: concepts.len(),
            biomarker_count: count_kind(matches, ConceptKind::Biomarker),
            symptom_count: count_kind(matches, ConceptKind::Symptom),
            high_relevance_count: matches
                .iter()
                .filter(|m| m.relevance >= HIGH_RELEVANCE)
                .count(),
        })
    }
}

fn count_kind(matches: &[SymptomMatch], kind: ConceptKind) -> usize {
    matches.iter().filter(|m| m.kind == kind).count()
}

pub fn sigmoid(x: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (-steepness * x).exp())
}

/// Risk score in `[0, 1]` for the per-symptom best matches.
pub fn score_matches(matches: &[SymptomMatch]) -> f64 {
    let Some(stats) = MatchStats::from_matches(matches) else {
        return 0.0;
    };
    score_stats(&stats).clamp(0.0, 1.0)
}

pub fn score_stats(stats: &MatchStats) -> f64 {
    // Single weak match.
    if stats.num_matches == 1 && stats.max_weighted < 0.5 {
        return sigmoid(stats.max_weighted * 0.6 - 0.3, 3.0).min(0.25);
    }

    // Severe signal: several strongly relevant biomarkers.
    if stats.biomarker_count >= 2 && stats.high_relevance_count >= 2 {
        let base = stats.avg_weighted * 1.5 + stats.num_concepts as f64 * 0.08;
        return sigmoid(base - 0.2, 4.0).min(0.98);
    }

    let dampened = match stats.num_matches {
        1 => stats.avg_weighted * 0.65,
        2 => stats.avg_weighted * 0.85,
        _ => stats.avg_weighted,
    };
    let diversity = 1.0 - (-(stats.num_concepts as f64) / 2.5).exp();
    let biomarker_mult = match stats.biomarker_count {
        0 => 1.0,
        1 => 1.15,
        2 => 1.4,
        _ => 1.6,
    };
    let symptom_boost = match stats.symptom_count {
        0..=2 => 1.0,
        3 => 1.1,
        _ => 1.2,
    };

    let raw = dampened * diversity * biomarker_mult * symptom_boost;
    sigmoid(raw - 0.38, 4.2)
}

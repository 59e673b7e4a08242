use std::{collections::BTreeMap, sync::Arc, time::Duration};

use crate::{
    ports::{ConceptKind, Criticality, SimilarityPort, invoke_guarded},
    scoring::formula::{DEFAULT_RELEVANCE, SymptomMatch, score_matches},
};

/// Absorbs the rounding in `1 - distance`, so a similarity exactly at the threshold is kept.
const THRESHOLD_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringSettings {
    pub top_k: usize,
    pub similarity_threshold: f64,
    pub timeout: Duration,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.45,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomAssessment {
    pub score: f64,
    pub matches: Vec<SymptomMatch>,
}

impl SymptomAssessment {
    /// Symptoms that matched a symptom or biomarker concept above threshold.
    pub fn relevant_symptoms(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.symptom.clone()).collect()
    }
}

pub struct RiskScorer {
    similarity: Arc<dyn SimilarityPort>,
    settings: ScoringSettings,
}

impl RiskScorer {
    pub fn new(similarity: Arc<dyn SimilarityPort>, settings: ScoringSettings) -> Self {
        Self {
            similarity,
            settings,
        }
    }

    pub async fn score(&self, symptoms: &[String]) -> f64 {
        self.assess(symptoms).await.score
    }

    /// Scores a symptom list; any lookup failure yields a zero score.
    pub async fn assess(&self, symptoms: &[String]) -> SymptomAssessment {
        if symptoms.is_empty() {
            return SymptomAssessment::default();
        }

        let mut best: BTreeMap<usize, SymptomMatch> = BTreeMap::new();
        for (index, symptom) in symptoms.iter().enumerate() {
            let lookup = invoke_guarded(
                "similarity",
                Criticality::Auxiliary,
                self.settings.timeout,
                self.similarity.query(symptom, self.settings.top_k),
            )
            .await;
            let Ok(Some(concepts)) = lookup else {
                tracing::warn!(
                    target: "scoring",
                    symptom = %symptom,
                    "similarity_lookup_failed"
                );
                return SymptomAssessment::default();
            };

            let mut best_weighted = 0.0;
            for concept in concepts {
                if !matches!(concept.kind, ConceptKind::Symptom | ConceptKind::Biomarker) {
                    continue;
                }
                let similarity = 1.0 - concept.distance;
                if !similarity.is_finite()
                    || similarity < self.settings.similarity_threshold - THRESHOLD_TOLERANCE
                {
                    continue;
                }
                let relevance = concept.relevance.unwrap_or(DEFAULT_RELEVANCE);
                let weighted = similarity * relevance;
                if weighted > best_weighted {
                    best_weighted = weighted;
                    best.insert(
                        index,
                        SymptomMatch {
                            symptom: symptom.clone(),
                            concept_id: concept.concept_id,
                            kind: concept.kind,
                            similarity,
                            relevance,
                            weighted,
                        },
                    );
                }
            }
        }

        let matches: Vec<SymptomMatch> = best.into_values().collect();
        let score = score_matches(&matches);
        tracing::info!(
            target: "scoring",
            symptoms = symptoms.len(),
            matched = matches.len(),
            score = score,
            "symptoms_scored"
        );
        SymptomAssessment { score, matches }
    }
}

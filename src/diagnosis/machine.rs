use std::{sync::Arc, time::Duration};

use crate::{
    diagnosis::{
        extract::{merge_symptoms, merge_vars},
        fusion::{fallback_interpretation, fuse},
        gating::{GateDecision, GatingPolicy, gate},
        state::DiagnosisState,
    },
    error::{EngineError, invariant_violation},
    ports::{
        Collaborators, Criticality, ExtractionRequest, ExtractorPort, MetabolicFeatures,
        NarrativeFacts, NarrativePort, RegressionPort, invoke_guarded,
    },
    scoring::{RiskScorer, ScoringSettings},
    session::{DiagnosisContext, QuestionType},
    types::{DiagnosisReport, HealthField, HealthProfile},
};

/// Upper bound on gating visits in one run: two question kinds, three
/// computations and a final pass, with headroom.
const MAX_GATING_VISITS: usize = 8;

pub const SYMPTOM_QUESTION: &str =
    "Could you list any symptoms you have noticed? e.g., fatigue, thirst...";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosisSettings {
    pub policy: GatingPolicy,
    pub scoring: ScoringSettings,
    pub collaborator_timeout: Duration,
}

impl Default for DiagnosisSettings {
    fn default() -> Self {
        Self {
            policy: GatingPolicy::default(),
            scoring: ScoringSettings::default(),
            collaborator_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Extracting,
    Normalizing,
    Gating,
    AskMoreVars(Vec<HealthField>),
    AskMoreSymptoms,
    ComputeIndex,
    ComputeSymptomScore,
    Fuse,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosisOutcome {
    Question {
        question_type: QuestionType,
        prompt: String,
    },
    Report(DiagnosisReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisRun {
    pub state: DiagnosisState,
    pub outcome: DiagnosisOutcome,
}

impl DiagnosisRun {
    pub fn profile(&self) -> HealthProfile {
        self.state.vars.to_profile()
    }
}

pub struct DiagnosisMachine {
    extractor: Arc<dyn ExtractorPort>,
    regression: Arc<dyn RegressionPort>,
    narrator: Arc<dyn NarrativePort>,
    scorer: RiskScorer,
    settings: DiagnosisSettings,
}

impl DiagnosisMachine {
    pub fn new(collaborators: &Collaborators, settings: DiagnosisSettings) -> Self {
        Self {
            extractor: Arc::clone(&collaborators.extractor),
            regression: Arc::clone(&collaborators.regression),
            narrator: Arc::clone(&collaborators.narrator),
            scorer: RiskScorer::new(Arc::clone(&collaborators.similarity), settings.scoring),
            settings,
        }
    }

    pub async fn run(
        &self,
        input: &str,
        profile: &HealthProfile,
        context: &DiagnosisContext,
    ) -> Result<DiagnosisRun, EngineError> {
        let mut state = DiagnosisState::seeded(profile, context);
        let mut stage = Stage::Extracting;
        let mut gating_visits = 0;

        loop {
            stage = match stage {
                Stage::Extracting => {
                    self.extract(&mut state, input).await?;
                    Stage::Normalizing
                }
                Stage::Normalizing => {
                    state.normalize();
                    Stage::Gating
                }
                Stage::Gating => {
                    gating_visits += 1;
                    if gating_visits > MAX_GATING_VISITS {
                        return Err(invariant_violation(format!(
                            "diagnosis gating did not settle after {MAX_GATING_VISITS} visits"
                        )));
                    }
                    let decision = gate(&state, &self.settings.policy);
                    tracing::debug!(
                        target: "diagnosis",
                        visit = gating_visits,
                        decision = ?decision,
                        "gating_decision"
                    );
                    match decision {
                        GateDecision::AskMoreVars(missing) => Stage::AskMoreVars(missing),
                        GateDecision::AskMoreSymptoms => Stage::AskMoreSymptoms,
                        GateDecision::ComputeIndex => Stage::ComputeIndex,
                        GateDecision::ComputeSymptomScore => Stage::ComputeSymptomScore,
                        GateDecision::Fuse => Stage::Fuse,
                        GateDecision::Done => Stage::Done,
                    }
                }
                Stage::AskMoreVars(missing) => {
                    let prompt = missing_fields_question(&missing);
                    return Ok(ask(state, QuestionType::Demographics, prompt));
                }
                Stage::AskMoreSymptoms => {
                    return Ok(ask(state, QuestionType::Symptoms, SYMPTOM_QUESTION.to_string()));
                }
                Stage::ComputeIndex => {
                    state.index_attempted = true;
                    state.mets_ir = self.compute_index(&state).await;
                    Stage::Gating
                }
                Stage::ComputeSymptomScore => {
                    let assessment = self.scorer.assess(&state.symptoms).await;
                    state.symptom_score = Some(assessment.score);
                    state.relevant_symptoms = assessment.relevant_symptoms();
                    Stage::Gating
                }
                Stage::Fuse => {
                    state.ready = true;
                    state.report = Some(self.fuse(&state).await?);
                    Stage::Gating
                }
                Stage::Done => {
                    let Some(report) = state.report.clone() else {
                        return Err(invariant_violation("diagnosis finished without a result"));
                    };
                    tracing::info!(
                        target: "diagnosis",
                        risk_level = %report.risk_level,
                        mets_ir = ?report.mets_ir,
                        symptom_score = ?report.symptom_score,
                        "diagnosis_completed"
                    );
                    return Ok(DiagnosisRun {
                        state,
                        outcome: DiagnosisOutcome::Report(report),
                    });
                }
            };
        }
    }

    async fn extract(&self, state: &mut DiagnosisState, input: &str) -> Result<(), EngineError> {
        let request = ExtractionRequest {
            raw_text: input.to_string(),
            current_profile: state.vars.to_profile(),
            current_symptoms: state.symptoms.clone(),
        };
        let extracted = invoke_guarded(
            "extractor",
            Criticality::LanguageModel,
            self.settings.collaborator_timeout,
            self.extractor.extract(request),
        )
        .await?;

        if let Some(extracted) = extracted {
            merge_vars(&mut state.vars, &extracted);
            let added = merge_symptoms(&mut state.symptoms, &extracted.symptoms);
            tracing::debug!(
                target: "diagnosis",
                fields = extracted.vars.len(),
                symptoms_added = added,
                "extraction_merged"
            );
        }
        Ok(())
    }

    async fn compute_index(&self, state: &DiagnosisState) -> Option<f64> {
        let profile = state.vars.to_profile();
        let features = MetabolicFeatures {
            age: profile.age?,
            gender: profile.gender?,
            bmi: profile.bmi()?,
            waist_cm: profile.waist_cm?,
        };

        let predicted = invoke_guarded(
            "regression",
            Criticality::Auxiliary,
            self.settings.collaborator_timeout,
            self.regression.predict(features),
        )
        .await
        .ok()
        .flatten()?;

        if !predicted.is_finite() {
            tracing::warn!(target: "diagnosis", value = predicted, "index_not_finite");
            return None;
        }
        Some(predicted)
    }

    async fn fuse(&self, state: &DiagnosisState) -> Result<DiagnosisReport, EngineError> {
        let verdict = fuse(
            state.mets_ir,
            state.symptom_score,
            state.relevant_symptoms.len(),
        );

        let facts = NarrativeFacts {
            risk_level: verdict.risk_level,
            dominant_factor: verdict.dominant_factor,
            mets_ir: state.mets_ir,
            symptom_score: state.symptom_score,
            symptoms: state.symptoms.clone(),
            relevant_symptoms: state.relevant_symptoms.clone(),
            raised_by_symptoms: verdict.raised_by_symptoms,
        };
        let narrative = invoke_guarded(
            "narrator",
            Criticality::LanguageModel,
            self.settings.collaborator_timeout,
            self.narrator.explain(facts),
        )
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

        let interpretation =
            narrative.unwrap_or_else(|| fallback_interpretation(&verdict, state.mets_ir));

        Ok(DiagnosisReport {
            risk_level: verdict.risk_level,
            dominant_factor: verdict.dominant_factor,
            interpretation,
            note: verdict.note,
            mets_ir: state.mets_ir,
            symptom_score: state.symptom_score,
        })
    }
}

fn ask(mut state: DiagnosisState, question_type: QuestionType, prompt: String) -> DiagnosisRun {
    let times_asked = state.ledger.record(question_type);
    state.ready = false;
    tracing::info!(
        target: "diagnosis",
        question_type = ?question_type,
        times_asked = times_asked,
        "clarifying_question"
    );
    DiagnosisRun {
        state,
        outcome: DiagnosisOutcome::Question {
            question_type,
            prompt,
        },
    }
}

pub fn missing_fields_question(missing: &[HealthField]) -> String {
    let mut names: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
    names.sort_unstable();
    format!(
        "Please provide the following health details: {}.",
        names.join(", ")
    )
}

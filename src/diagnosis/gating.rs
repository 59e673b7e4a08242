use crate::{
    diagnosis::state::DiagnosisState,
    session::QuestionType,
    types::HealthField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatingPolicy {
    pub max_question_repeats: u32,
    pub min_symptoms: usize,
}

impl Default for GatingPolicy {
    fn default() -> Self {
        Self {
            max_question_repeats: 2,
            min_symptoms: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    AskMoreVars(Vec<HealthField>),
    AskMoreSymptoms,
    ComputeIndex,
    ComputeSymptomScore,
    Fuse,
    Done,
}

/// Next step of a diagnosis run; rules are checked in fixed priority order.
pub fn gate(state: &DiagnosisState, policy: &GatingPolicy) -> GateDecision {
    let missing = state.vars.missing();

    if !missing.is_empty()
        && state.mets_ir.is_none()
        && state.ledger.times_asked(QuestionType::Demographics) < policy.max_question_repeats
    {
        return GateDecision::AskMoreVars(missing);
    }

    if state.symptoms.len() < policy.min_symptoms
        && state.ledger.times_asked(QuestionType::Symptoms) < policy.max_question_repeats
    {
        return GateDecision::AskMoreSymptoms;
    }

    if state.mets_ir.is_none() && !state.index_attempted && missing.is_empty() {
        return GateDecision::ComputeIndex;
    }

    if state.symptom_score.is_none() && !state.symptoms.is_empty() {
        return GateDecision::ComputeSymptomScore;
    }

    if state.report.is_none() {
        return GateDecision::Fuse;
    }

    GateDecision::Done
}

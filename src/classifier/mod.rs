//! Intent, diagnosis status, data sufficiency and scope of a turn.
//!
//! Everything here is a pure function of the turn text and the session
//! memory; the guidance table turns the result into a routing decision.

pub mod guidance;
pub mod keywords;

use serde::Serialize;

use crate::{
    session::ConversationMemory,
    types::{ContextAppropriateness, DiagnosisStatus, HealthField, Intent, Sufficiency},
};

pub use guidance::{TableRoute, route_by_table};

pub const DIAGNOSIS_SUFFICIENT_FIELDS: usize = 4;
pub const DIAGNOSIS_PARTIAL_FIELDS: usize = 2;
pub const NUTRITION_SUFFICIENT_FIELDS: usize = 3;
pub const NUTRITION_PARTIAL_FIELDS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataSufficiency {
    pub diagnosis: Sufficiency,
    pub nutrition: Sufficiency,
    pub available_fields: usize,
    pub total_required: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub intent: Intent,
    pub diagnosis_status: DiagnosisStatus,
    pub sufficiency: DataSufficiency,
    pub appropriateness: ContextAppropriateness,
}

pub fn classify(
    decomposition: &str,
    input: &str,
    memory: &ConversationMemory,
    diagnosis_this_turn: bool,
) -> Classification {
    let intent_text = if decomposition.trim().is_empty() {
        input
    } else {
        decomposition
    };

    Classification {
        intent: classify_intent(intent_text),
        diagnosis_status: diagnosis_status(memory, diagnosis_this_turn),
        sufficiency: data_sufficiency(memory),
        appropriateness: context_appropriateness(decomposition, input),
    }
}

/// Keyword sets are checked in priority order; the first hit wins.
pub fn classify_intent(text: &str) -> Intent {
    if text.trim().is_empty() {
        return Intent::General;
    }
    if keywords::INTENT_OUT_OF_CONTEXT.matches(text) {
        Intent::OutOfContext
    } else if keywords::INTENT_HEALTH.matches(text) {
        Intent::Health
    } else if keywords::INTENT_NUTRITION.matches(text) {
        Intent::Nutrition
    } else if keywords::INTENT_FOLLOWUP.matches(text) {
        Intent::Followup
    } else {
        Intent::General
    }
}

pub fn diagnosis_status(memory: &ConversationMemory, diagnosis_this_turn: bool) -> DiagnosisStatus {
    if memory.diagnosis_completed || memory.last_diagnosis_result.is_some() || diagnosis_this_turn {
        DiagnosisStatus::Complete
    } else if memory.health_profile.present_count() >= 1 {
        DiagnosisStatus::Partial
    } else {
        DiagnosisStatus::None
    }
}

pub fn data_sufficiency(memory: &ConversationMemory) -> DataSufficiency {
    let available_fields = memory.health_profile.present_count();

    let diagnosis = if available_fields >= DIAGNOSIS_SUFFICIENT_FIELDS {
        Sufficiency::Sufficient
    } else if available_fields >= DIAGNOSIS_PARTIAL_FIELDS {
        Sufficiency::Partial
    } else {
        Sufficiency::Insufficient
    };

    let nutrition = if memory.diagnosis_completed || available_fields >= NUTRITION_SUFFICIENT_FIELDS
    {
        Sufficiency::Sufficient
    } else if available_fields >= NUTRITION_PARTIAL_FIELDS || memory.has_history() {
        Sufficiency::Partial
    } else {
        Sufficiency::Insufficient
    };

    DataSufficiency {
        diagnosis,
        nutrition,
        available_fields,
        total_required: HealthField::REQUIRED.len(),
    }
}

pub fn context_appropriateness(decomposition: &str, input: &str) -> ContextAppropriateness {
    let text = format!("{decomposition} {input}");
    if text.trim().is_empty() {
        return ContextAppropriateness::Unclear;
    }
    if keywords::SCOPE_OUT_OF_CONTEXT.matches(&text) {
        ContextAppropriateness::OutOfContext
    } else if keywords::SCOPE_IN_CONTEXT.matches(&text) {
        ContextAppropriateness::Appropriate
    } else {
        ContextAppropriateness::Unclear
    }
}

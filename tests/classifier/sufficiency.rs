use nutrisense::{
    classifier::{classify, context_appropriateness, data_sufficiency},
    session::ConversationMemory,
    types::{ContextAppropriateness, DiagnosisStatus, Sufficiency},
};

use super::{four_field_profile, memory_with_profile};

#[test]
fn given_four_fields_then_both_branches_are_sufficient() {
    let sufficiency = data_sufficiency(&memory_with_profile(four_field_profile()));
    assert_eq!(sufficiency.available_fields, 4);
    assert_eq!(sufficiency.total_required, 5);
    assert_eq!(sufficiency.diagnosis, Sufficiency::Sufficient);
    assert_eq!(sufficiency.nutrition, Sufficiency::Sufficient);
}

#[test]
fn given_decomposition_present_then_intent_follows_decomposition() {
    let memory = ConversationMemory::default();
    let classification = classify(
        "QUESTIONS:\n- Which snack fits a low carb diet?",
        "hmm",
        &memory,
        false,
    );
    assert_eq!(classification.intent.as_str(), "nutrition");
    assert_eq!(
        classification.appropriateness,
        ContextAppropriateness::Appropriate
    );
}

#[test]
fn given_diagnosis_finished_this_turn_then_status_is_complete() {
    let memory = memory_with_profile(four_field_profile());
    assert_eq!(
        classify("", "thanks", &memory, false).diagnosis_status,
        DiagnosisStatus::Partial
    );
    assert_eq!(
        classify("", "thanks", &memory, true).diagnosis_status,
        DiagnosisStatus::Complete
    );
}

#[test]
fn given_news_question_then_scope_is_out_of_context() {
    assert_eq!(
        context_appropriateness("", "any stock tips"),
        ContextAppropriateness::OutOfContext
    );
}

use nutrisense::{
    session::{ConversationMemory, MemoryLimits, QuestionType},
    types::{DiagnosisReport, DominantFactor, Gender, HealthProfile, Intent, RiskLevel},
};

use super::record;

#[test]
fn given_custom_limits_when_recording_then_oldest_entries_are_dropped() {
    let limits = MemoryLimits {
        max_history: 3,
        max_intent_history: 2,
    };
    let mut memory = ConversationMemory::default();
    for turn in 0..5 {
        memory.record_interaction(record(&format!("turn {turn}")), limits);
        memory.record_intent(Intent::Health, limits);
    }
    memory.record_intent(Intent::Nutrition, limits);

    let inputs: Vec<&str> = memory.history.iter().map(|r| r.input.as_str()).collect();
    assert_eq!(inputs, vec!["turn 2", "turn 3", "turn 4"]);
    assert_eq!(memory.intent_history.len(), 2);
    assert_eq!(memory.previous_intent(), Some(Intent::Nutrition));
}

#[test]
fn given_completed_diagnosis_then_summary_reports_it() {
    let memory = ConversationMemory {
        diagnosis_completed: true,
        last_diagnosis_result: Some(DiagnosisReport {
            risk_level: RiskLevel::High,
            dominant_factor: DominantFactor::Balanced,
            interpretation: "elevated".to_string(),
            note: None,
            mets_ir: Some(52.0),
            symptom_score: Some(0.7),
        }),
        health_profile: HealthProfile {
            age: Some(50.0),
            gender: Some(Gender::Female),
            waist_cm: Some(101.0),
            ..HealthProfile::default()
        },
        ..ConversationMemory::default()
    };
    let summary = memory.summary();
    assert!(summary.diagnosis_completed);
    assert_eq!(summary.health_profile_completeness, 3);
    assert_eq!(
        summary.last_diagnosis.map(|report| report.risk_level),
        Some(RiskLevel::High)
    );
}

#[test]
fn given_memory_round_trips_through_json_then_ledger_is_kept() {
    let mut memory = ConversationMemory::default();
    memory.diagnosis_context.symptoms.push("fatigue".to_string());
    memory
        .diagnosis_context
        .question_ledger
        .record(QuestionType::Symptoms);

    let encoded = serde_json::to_string(&memory).expect("memory should serialize");
    let decoded: ConversationMemory =
        serde_json::from_str(&encoded).expect("memory should deserialize");
    assert_eq!(decoded, memory);
    assert_eq!(
        decoded
            .diagnosis_context
            .question_ledger
            .times_asked(QuestionType::Symptoms),
        1
    );
}

use std::sync::{Arc, Mutex};

use nutrisense::{
    diagnosis::{DiagnosisOutcome, SYMPTOM_QUESTION},
    error::EngineErrorKind,
    ports::{CollaboratorError, ConceptKind, ConceptMatch, ExtractedInfo, MetabolicFeatures},
    session::{DiagnosisContext, QuestionType},
    testing::{ScriptedCollaborators, SimilarityQuery},
    types::{DominantFactor, Gender, HealthProfile, RiskLevel},
};
use serde_json::json;

use super::{extracted, machine};

#[tokio::test]
async fn given_user_never_supplies_fields_then_each_question_is_asked_at_most_twice() {
    let machine = machine(
        ScriptedCollaborators::new().with_extract(|_| async { Ok(ExtractedInfo::default()) }),
    );

    let mut profile = HealthProfile::default();
    let mut context = DiagnosisContext::default();
    let mut asked = Vec::new();
    let mut report = None;
    for _ in 0..6 {
        let run = machine
            .run("I'd rather not say", &profile, &context)
            .await
            .expect("run should not fail");
        profile = run.profile();
        let outcome = run.outcome.clone();
        context = run.state.into_context();
        match outcome {
            DiagnosisOutcome::Question { question_type, .. } => asked.push(question_type),
            DiagnosisOutcome::Report(result) => {
                report = Some(result);
                break;
            }
        }
    }

    assert_eq!(
        asked,
        vec![
            QuestionType::Demographics,
            QuestionType::Demographics,
            QuestionType::Symptoms,
            QuestionType::Symptoms,
        ]
    );
    let report = report.expect("diagnosis should end with a report");
    assert_eq!(report.risk_level, RiskLevel::Unknown);
    assert!(report.mets_ir.is_none());
    assert_eq!(
        context.question_ledger.times_asked(QuestionType::Demographics),
        2
    );
}

#[tokio::test]
async fn given_complete_profile_without_symptoms_then_symptoms_are_requested() {
    let profile = HealthProfile {
        age: Some(45.0),
        weight_kg: Some(90.0),
        height_m: Some(1.8),
        waist_cm: Some(100.0),
        gender: Some(Gender::Female),
    };
    let machine = machine(
        ScriptedCollaborators::new().with_extract(|_| async { Ok(ExtractedInfo::default()) }),
    );

    let run = machine
        .run("here you go", &profile, &DiagnosisContext::default())
        .await
        .expect("run should not fail");
    assert_eq!(
        run.outcome,
        DiagnosisOutcome::Question {
            question_type: QuestionType::Symptoms,
            prompt: SYMPTOM_QUESTION.to_string(),
        }
    );
}

#[tokio::test]
async fn given_everything_in_one_message_then_symptoms_raise_the_index_tier() {
    let features_seen: Arc<Mutex<Option<MetabolicFeatures>>> = Arc::new(Mutex::new(None));
    let recorded = Arc::clone(&features_seen);
    let machine = machine(
        ScriptedCollaborators::new()
            .with_extract(|_| async {
                Ok(extracted(
                    &[
                        ("age", json!(45)),
                        ("gender", json!("male")),
                        ("weight", json!("280 lbs")),
                        ("height", json!("5'8\"")),
                        ("waist", json!("38 in")),
                    ],
                    &["fatigue", "excessive thirst", "blurry vision", "big belly"],
                ))
            })
            .with_regression(move |features| {
                if let Ok(mut slot) = recorded.lock() {
                    *slot = Some(features);
                }
                async { Ok(44.0) }
            })
            .with_similarity(|query: SimilarityQuery| async move {
                Ok(vec![ConceptMatch {
                    concept_id: format!("concept:{}", query.phrase),
                    kind: ConceptKind::Biomarker,
                    relevance: Some(0.8),
                    distance: 0.25,
                }])
            })
            .with_narrate(|facts| async move {
                Ok(format!("Your risk is {} overall.", facts.risk_level))
            }),
    );

    let run = machine
        .run(
            "45yo male, 280 lbs, 5'8\", waist 38in, tired and thirsty with blurry vision",
            &HealthProfile::default(),
            &DiagnosisContext::default(),
        )
        .await
        .expect("run should not fail");

    let DiagnosisOutcome::Report(report) = &run.outcome else {
        panic!("expected a report, got {:?}", run.outcome);
    };
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.dominant_factor, DominantFactor::Balanced);
    assert_eq!(report.mets_ir, Some(44.0));
    assert!(report.symptom_score.is_some_and(|score| score > 0.9));
    assert_eq!(report.interpretation, "Your risk is High overall.");

    assert_eq!(run.state.symptoms.len(), 3);
    let profile = run.profile();
    assert!(profile.is_complete());
    assert!((profile.waist_cm.unwrap_or_default() - 96.52).abs() < 1e-9);

    let features = (*features_seen.lock().expect("feature slot should lock"))
        .expect("regression should be called");
    assert_eq!(features.gender, Gender::Male);
    assert!((features.waist_cm - 96.52).abs() < 1e-9);
    assert!(features.bmi > 40.0 && features.bmi < 45.0);
}

#[tokio::test]
async fn given_regression_unavailable_then_report_is_unknown_with_symptom_score() {
    let profile = HealthProfile {
        age: Some(52.0),
        weight_kg: Some(70.0),
        height_m: Some(1.7),
        waist_cm: Some(85.0),
        gender: Some(Gender::Female),
    };
    let context = DiagnosisContext {
        symptoms: vec!["fatigue".into(), "thirst".into(), "tingling feet".into()],
        ..DiagnosisContext::default()
    };
    let machine = machine(
        ScriptedCollaborators::new()
            .with_extract(|_| async { Ok(ExtractedInfo::default()) })
            .with_regression(|_| async {
                Err(CollaboratorError::unavailable("regression", "model offline"))
            })
            .with_similarity(|_| async { Ok(Vec::new()) }),
    );

    let run = machine
        .run("that's all", &profile, &context)
        .await
        .expect("run should not fail");
    let DiagnosisOutcome::Report(report) = run.outcome else {
        panic!("expected a report");
    };
    assert_eq!(report.risk_level, RiskLevel::Unknown);
    assert_eq!(report.dominant_factor, DominantFactor::SymptomScore);
    assert_eq!(report.symptom_score, Some(0.0));
    assert!(!report.interpretation.is_empty());
}

#[tokio::test]
async fn given_extractor_unconfigured_then_run_aborts() {
    let machine = machine(ScriptedCollaborators::new().with_extract(|_| async {
        Err(CollaboratorError::unconfigured("extractor"))
    }));

    let err = machine
        .run("hello", &HealthProfile::default(), &DiagnosisContext::default())
        .await
        .expect_err("unconfigured extractor should abort");
    assert_eq!(err.kind, EngineErrorKind::CollaboratorUnconfigured);
}

use nutrisense::{
    classifier::guidance::GENERAL_CAPABILITY_SUMMARY,
    config::EngineConfig,
    error::EngineErrorKind,
    orchestrator::{APOLOGY, Orchestrator},
    ports::{CollaboratorError, Collaborators, ExtractedInfo},
    session::{ConversationMemory, DiagnosisContext},
    types::RoutingDecision,
};
use serde_json::json;

use super::{complete_profile, decomposing_to, orchestrator, seeded_orchestrator};

#[tokio::test]
async fn given_no_language_model_then_reply_is_apology_and_memory_is_untouched() {
    let orchestrator = Orchestrator::new(Collaborators::unconfigured(), EngineConfig::default());
    assert!(!orchestrator.validate().llm_configured);

    let reply = orchestrator.respond("s1", "Am I at risk of diabetes?").await;
    assert_eq!(reply, APOLOGY);

    let summary = orchestrator.summary("s1").await;
    assert_eq!(summary.conversation_turns, 0);
    assert!(summary.recent_intents.is_empty());
}

#[tokio::test]
async fn given_blank_session_id_then_turn_is_rejected() {
    let orchestrator = orchestrator(decomposing_to(""));
    let err = orchestrator
        .handle_turn("  ", "hello")
        .await
        .expect_err("blank session id should be rejected");
    assert_eq!(err.kind, EngineErrorKind::InvalidRequest);
    assert_eq!(orchestrator.respond("", "hello").await, APOLOGY);
}

#[tokio::test]
async fn given_router_failure_then_turn_falls_back_to_finalize() {
    let orchestrator = orchestrator(decomposing_to(""));

    let turn = orchestrator
        .handle_turn("s1", "does my computer job raise my blood sugar")
        .await
        .expect("router failure is recoverable");
    assert_eq!(turn.routing.routing_decision, RoutingDecision::Finalize);
    assert_eq!(turn.routing.confidence, 0.3);
    assert_eq!(
        turn.routing.reasoning,
        "Fallback to finalize after routing collaborator failure"
    );
    assert_eq!(turn.final_response, GENERAL_CAPABILITY_SUMMARY);
}

#[tokio::test]
async fn given_unconfigured_narrator_mid_diagnosis_then_profile_updates_are_discarded() {
    let scripted = decomposing_to("")
        .with_extract(|_| async {
            Ok(ExtractedInfo {
                vars: [("age".to_string(), json!(59))].into_iter().collect(),
                symptoms: Vec::new(),
            })
        })
        .with_regression(|_| async { Ok(41.0) })
        .with_similarity(|_| async { Ok(Vec::new()) })
        .with_narrate(|_| async { Err(CollaboratorError::unconfigured("narrator")) });
    let memory = ConversationMemory {
        health_profile: complete_profile(),
        diagnosis_context: DiagnosisContext {
            symptoms: vec!["fatigue".into(), "thirst".into(), "dry mouth".into()],
            ..DiagnosisContext::default()
        },
        ..ConversationMemory::default()
    };
    let orchestrator = seeded_orchestrator(scripted, "s1", memory.clone()).await;

    assert_eq!(orchestrator.respond("s1", "what is my risk").await, APOLOGY);
    assert_eq!(orchestrator.sessions().snapshot("s1").await, memory);
}

#[tokio::test]
async fn given_auxiliary_services_unconfigured_then_diagnosis_still_reports() {
    let scripted = decomposing_to("")
        .with_extract(|_| async { Ok(Default::default()) })
        .with_regression(|_| async { Err(CollaboratorError::unconfigured("regression model")) })
        .with_similarity(|_| async {
            Err(CollaboratorError::unconfigured("similarity lookup"))
        });
    let memory = ConversationMemory {
        health_profile: complete_profile(),
        diagnosis_context: DiagnosisContext {
            symptoms: vec!["fatigue".into(), "thirst".into(), "dry mouth".into()],
            ..DiagnosisContext::default()
        },
        ..ConversationMemory::default()
    };
    let orchestrator = seeded_orchestrator(scripted, "s1", memory).await;

    let turn = orchestrator
        .handle_turn("s1", "what is my risk")
        .await
        .expect("auxiliary failures degrade");
    let diagnosis = turn.diagnosis_result.expect("report should still be produced");
    assert!(diagnosis.starts_with("Risk Level: Unknown"));
    assert!(orchestrator.summary("s1").await.diagnosis_completed);
}

use std::sync::Arc;

use nutrisense::{
    llm::{ChatClient, LlmCollaborator, LlmConfig, types::CredentialRef},
    ports::{
        CollaboratorError, DecomposerPort, GlycemicRisk, MessageIntent, NutritionMode,
        NutritionPort, NutritionRequest, PolishRequest, PolisherPort, Tone,
    },
};

use super::{completion_body, config_for, one_shot_server};

fn collaborator(config: LlmConfig) -> LlmCollaborator {
    LlmCollaborator::new(Arc::new(ChatClient::new(config).expect("client should build")))
}

#[tokio::test]
async fn given_decomposition_reply_then_it_is_trimmed() {
    let (addr, _server) = one_shot_server(
        "200 OK",
        &completion_body("  INFORMATION:\n- The user is 45 years old\n"),
    )
    .await;
    let llm = collaborator(config_for(addr, CredentialRef::None));

    let decomposition = llm
        .decompose("I'm 45")
        .await
        .expect("decomposition should succeed");
    assert_eq!(decomposition, "INFORMATION:\n- The user is 45 years old");
}

#[tokio::test]
async fn given_fenced_advice_with_capitalised_risk_then_it_decodes() {
    let reply = "```json\n{\"advice\": \"Swap white rice for cauliflower rice\", \"glycemic_risk\": \"High\", \"improvements\": [\"more fiber\"], \"calorie_estimate\": 620}\n```";
    let (addr, _server) = one_shot_server("200 OK", &completion_body(reply)).await;
    let llm = collaborator(config_for(addr, CredentialRef::None));

    let advice = llm
        .give_advice(NutritionRequest {
            text: "is fried rice ok".to_string(),
            risk_level: None,
        })
        .await
        .expect("advice should decode");
    assert_eq!(advice.glycemic_risk, GlycemicRisk::High);
    assert_eq!(advice.calorie_estimate, 620.0);
}

#[tokio::test]
async fn given_unexpected_mode_label_then_reply_is_malformed() {
    let (addr, _server) = one_shot_server("200 OK", &completion_body("maybe both?")).await;
    let llm = collaborator(config_for(addr, CredentialRef::None));

    let err = llm
        .classify("pasta")
        .await
        .expect_err("unknown label should fail");
    assert!(matches!(err, CollaboratorError::Malformed { .. }));
}

#[tokio::test]
async fn given_mode_label_in_prose_then_it_is_recognised() {
    let (addr, _server) =
        one_shot_server("200 OK", &completion_body("The mode is SUGGEST_DISH.")).await;
    let llm = collaborator(config_for(addr, CredentialRef::None));

    assert_eq!(
        llm.classify("dinner idea").await.expect("label should parse"),
        NutritionMode::SuggestDish
    );
}

#[tokio::test]
async fn given_missing_credential_variable_then_collaborator_is_unconfigured() {
    let addr = "127.0.0.1:9".parse().expect("address should parse");
    let llm = collaborator(config_for(
        addr,
        CredentialRef::Env {
            var: "NUTRISENSE_TEST_UNSET_API_KEY".to_string(),
        },
    ));

    let err = llm
        .polish(PolishRequest {
            intent: MessageIntent::Explain,
            tone: Tone::Friendly,
            source_text: "DIAGNOSIS:\nN/A\n\nNUTRITION:\nN/A".to_string(),
        })
        .await
        .expect_err("missing credential should fail");
    assert!(err.is_unconfigured());
}

#[tokio::test]
async fn given_backend_error_then_collaborator_is_unavailable() {
    let (addr, _server) =
        one_shot_server("503 Service Unavailable", r#"{"error":"overloaded"}"#).await;
    let llm = collaborator(config_for(addr, CredentialRef::None));

    let err = llm
        .decompose("hello")
        .await
        .expect_err("503 should fail");
    assert!(matches!(err, CollaboratorError::Unavailable { .. }));
}

use nutrisense::llm::{
    ChatClient, ChatMessage, LlmErrorKind, LlmRole, OutputMode, types::CredentialRef,
};

use super::{completion_body, config_for, one_shot_server};

#[tokio::test]
async fn given_successful_completion_then_content_is_returned_and_bearer_is_sent() {
    let (addr, server) = one_shot_server("200 OK", &completion_body("hello back")).await;
    let client = ChatClient::new(config_for(
        addr,
        CredentialRef::InlineToken {
            token: "secret-token".to_string(),
        },
    ))
    .expect("client should build");

    let reply = client
        .complete(
            LlmRole::Polisher,
            &[ChatMessage::system("be brief"), ChatMessage::user("hello")],
            OutputMode::JsonObject,
        )
        .await
        .expect("completion should succeed");
    assert_eq!(reply, "hello back");

    let request = server.await.expect("server task should finish");
    let lowered = request.to_lowercase();
    assert!(lowered.starts_with("post /v1/chat/completions "));
    assert!(lowered.contains("authorization: bearer secret-token"));
    assert!(lowered.contains("x-request-id: "));
    assert!(request.contains("\"model\":\"m1\""));
    assert!(request.contains("\"response_format\":{\"type\":\"json_object\"}"));
    assert!(request.contains("\"temperature\":0.45"));
}

#[tokio::test]
async fn given_rate_limited_backend_then_error_is_retryable_rate_limit() {
    let (addr, server) =
        one_shot_server("429 Too Many Requests", r#"{"error":"slow down"}"#).await;
    let client =
        ChatClient::new(config_for(addr, CredentialRef::None)).expect("client should build");

    let err = client
        .complete(LlmRole::Router, &[ChatMessage::user("route")], OutputMode::Text)
        .await
        .expect_err("429 should fail");
    assert_eq!(err.kind, LlmErrorKind::RateLimited);
    assert!(err.retryable);
    assert_eq!(err.http_status, Some(429));
    assert_eq!(err.backend_id.as_deref(), Some("local"));

    let request = server.await.expect("server task should finish");
    assert!(!request.to_lowercase().contains("authorization:"));
    assert!(!request.contains("response_format"));
}

#[tokio::test]
async fn given_rejected_key_then_error_is_authentication() {
    let (addr, _server) = one_shot_server("401 Unauthorized", r#"{"error":"bad key"}"#).await;
    let client = ChatClient::new(config_for(
        addr,
        CredentialRef::InlineToken {
            token: "wrong".to_string(),
        },
    ))
    .expect("client should build");

    let err = client
        .complete(LlmRole::Extractor, &[ChatMessage::user("x")], OutputMode::Text)
        .await
        .expect_err("401 should fail");
    assert_eq!(err.kind, LlmErrorKind::Authentication);
    assert!(!err.retryable);
    assert_eq!(err.http_status, Some(401));
}

#[tokio::test]
async fn given_reply_without_choices_then_error_is_protocol_violation() {
    let (addr, _server) = one_shot_server("200 OK", r#"{"choices":[]}"#).await;
    let client =
        ChatClient::new(config_for(addr, CredentialRef::None)).expect("client should build");

    let err = client
        .complete(LlmRole::Narrator, &[ChatMessage::user("x")], OutputMode::Text)
        .await
        .expect_err("empty choices should fail");
    assert_eq!(err.kind, LlmErrorKind::ProtocolViolation);
}

#[test]
fn given_config_without_default_alias_then_client_is_not_built() {
    let addr = "127.0.0.1:9".parse().expect("address should parse");
    let mut config = config_for(addr, CredentialRef::None);
    config.route_aliases.clear();
    let err = match ChatClient::new(config) {
        Ok(_) => panic!("missing default alias should fail"),
        Err(err) => err,
    };
    assert_eq!(err.kind, LlmErrorKind::InvalidRequest);
}

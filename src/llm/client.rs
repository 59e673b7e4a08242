use std::{sync::Arc, time::Duration};

use reqwest::{Client, header};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::llm::{
    credentials::{CredentialProvider, EnvCredentialProvider},
    error::{LlmError, LlmErrorKind, invalid_request, map_http_error, protocol_violation},
    types::{LlmConfig, LlmRole},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    fn as_wire(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    JsonObject,
}

/// Non-streaming chat completions against OpenAI-compatible backends,
/// routed per [`LlmRole`].
pub struct ChatClient {
    http: Client,
    config: LlmConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        Self::with_credentials(config, Arc::new(EnvCredentialProvider))
    }

    pub fn with_credentials(
        config: LlmConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, LlmError> {
        config.validate()?;
        let http = Client::builder()
            .build()
            .map_err(|err| invalid_request(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub async fn complete(
        &self,
        role: LlmRole,
        messages: &[ChatMessage],
        output_mode: OutputMode,
    ) -> Result<String, LlmError> {
        let target = self
            .config
            .route_for(role)
            .ok_or_else(|| invalid_request(format!("no route for role {}", role.as_str())))?;
        let backend = self.config.backend(&target.backend_id).ok_or_else(|| {
            invalid_request(format!("unknown backend {}", target.backend_id))
        })?;
        let credential = self.credentials.resolve(&backend.credential, backend).await?;

        let url = format!("{}/chat/completions", backend.endpoint.trim_end_matches('/'));
        let mut body = json!({
            "model": target.model_id,
            "messages": messages
                .iter()
                .map(|message| json!({"role": message.role.as_wire(), "content": message.content}))
                .collect::<Vec<_>>(),
            "temperature": self.config.temperature_for(role),
            "stream": false,
        });
        if output_mode == OutputMode::JsonObject {
            body["response_format"] = json!({"type": "json_object"});
        }

        let request_id = Uuid::now_v7().to_string();
        let mut req_builder = self
            .http
            .post(url)
            .timeout(Duration::from_millis(self.config.request_timeout_ms))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", &request_id)
            .json(&body);
        if let Some(auth_header) = credential.auth_header {
            req_builder = req_builder.header(header::AUTHORIZATION, auth_header);
        }

        tracing::debug!(
            target: "llm",
            request_id = %request_id,
            role = role.as_str(),
            backend_id = %backend.id,
            model = %target.model_id,
            "chat_request_sent"
        );

        let response = req_builder.send().await.map_err(|err| {
            let kind = if err.is_timeout() {
                LlmErrorKind::Timeout
            } else {
                LlmErrorKind::BackendTransient
            };
            LlmError::new(kind, format!("chat request failed: {err}"))
                .with_backend_id(backend.id.clone())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = map_http_error(status.as_u16(), &backend.id, &body);
            tracing::warn!(
                target: "llm",
                request_id = %request_id,
                role = role.as_str(),
                status = status.as_u16(),
                error = %err,
                "chat_request_rejected"
            );
            return Err(err);
        }

        let payload: Value = response.json().await.map_err(|err| {
            protocol_violation(format!("chat response is not json: {err}"))
                .with_backend_id(backend.id.clone())
        })?;
        let content = parse_completion(&payload, &backend.id)?;

        tracing::debug!(
            target: "llm",
            request_id = %request_id,
            role = role.as_str(),
            chars = content.len(),
            "chat_response_received"
        );
        Ok(content)
    }
}

fn parse_completion(payload: &Value, backend_id: &str) -> Result<String, LlmError> {
    let choice = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| {
            protocol_violation("chat response missing choices").with_backend_id(backend_id)
        })?;

    choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            protocol_violation("chat response missing message content").with_backend_id(backend_id)
        })
}

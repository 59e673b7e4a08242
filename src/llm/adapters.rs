use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    llm::{
        client::{ChatClient, ChatMessage, OutputMode},
        error::{LlmError, LlmErrorKind},
        prompts,
        types::LlmRole,
    },
    ports::{
        CollaboratorError, DecomposerPort, DishAdvice, DishSuggestion, ExtractedInfo,
        ExtractionRequest, ExtractorPort, NarrativeFacts, NarrativePort, NutritionMode,
        NutritionPort, NutritionRequest, PolishRequest, PolisherPort, RoutingAdvice,
        RoutingAdvisorPort, RoutingContext,
    },
    types::RoutingDecision,
};

/// Every language-model collaborator, backed by one [`ChatClient`].
#[derive(Clone)]
pub struct LlmCollaborator {
    client: Arc<ChatClient>,
}

impl LlmCollaborator {
    pub fn new(client: Arc<ChatClient>) -> Self {
        Self { client }
    }

    async fn chat(
        &self,
        role: LlmRole,
        messages: Vec<ChatMessage>,
        output_mode: OutputMode,
    ) -> Result<String, CollaboratorError> {
        self.client
            .complete(role, &messages, output_mode)
            .await
            .map_err(|err| collaborator_error(role, err, self.client.config().request_timeout_ms))
    }

    async fn chat_json(
        &self,
        role: LlmRole,
        messages: Vec<ChatMessage>,
    ) -> Result<Value, CollaboratorError> {
        let reply = self.chat(role, messages, OutputMode::JsonObject).await?;
        parse_json_reply(&reply)
            .ok_or_else(|| CollaboratorError::malformed(role.as_str(), "reply is not a json object"))
    }
}

fn collaborator_error(role: LlmRole, err: LlmError, timeout_ms: u64) -> CollaboratorError {
    let collaborator = role.as_str();
    match err.kind {
        LlmErrorKind::Timeout => CollaboratorError::Timeout {
            collaborator: collaborator.to_string(),
            timeout_ms,
        },
        LlmErrorKind::ProtocolViolation => CollaboratorError::malformed(collaborator, err.to_string()),
        // Raised before any request leaves the process: routing or credentials are missing.
        LlmErrorKind::InvalidRequest | LlmErrorKind::Authentication
            if err.http_status.is_none() =>
        {
            CollaboratorError::Unconfigured {
                collaborator: format!("{collaborator} ({err})"),
            }
        }
        _ => CollaboratorError::unavailable(collaborator, err.to_string()),
    }
}

/// Extracts the JSON object of a model reply, tolerating code fences and
/// surrounding prose.
pub fn parse_json_reply(reply: &str) -> Option<Value> {
    let trimmed = reply.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(unfenced) {
        return Some(value);
    }

    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&unfenced[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn decode<T: for<'de> Deserialize<'de>>(role: LlmRole, value: Value) -> Result<T, CollaboratorError> {
    serde_json::from_value(value)
        .map_err(|err| CollaboratorError::malformed(role.as_str(), err.to_string()))
}

#[derive(Debug, Deserialize)]
struct NarrativeReply {
    response: String,
}

#[derive(Debug, Deserialize)]
struct RoutingReply {
    routing_decision: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: String,
}

#[async_trait]
impl DecomposerPort for LlmCollaborator {
    async fn decompose(&self, text: &str) -> Result<String, CollaboratorError> {
        let reply = self
            .chat(LlmRole::Decomposer, prompts::decomposer(text), OutputMode::Text)
            .await?;
        Ok(reply.trim().to_string())
    }
}

#[async_trait]
impl ExtractorPort for LlmCollaborator {
    async fn extract(&self, req: ExtractionRequest) -> Result<ExtractedInfo, CollaboratorError> {
        let value = self
            .chat_json(LlmRole::Extractor, prompts::extractor(&req))
            .await?;
        decode(LlmRole::Extractor, value)
    }
}

#[async_trait]
impl NarrativePort for LlmCollaborator {
    async fn explain(&self, facts: NarrativeFacts) -> Result<String, CollaboratorError> {
        let reply = self
            .chat(LlmRole::Narrator, prompts::narrator(&facts), OutputMode::JsonObject)
            .await?;
        match parse_json_reply(&reply) {
            Some(value) => decode::<NarrativeReply>(LlmRole::Narrator, value)
                .map(|narrative| narrative.response),
            None => Ok(reply.trim().to_string()),
        }
    }
}

#[async_trait]
impl RoutingAdvisorPort for LlmCollaborator {
    async fn advise(&self, ctx: RoutingContext) -> Result<RoutingAdvice, CollaboratorError> {
        let value = self.chat_json(LlmRole::Router, prompts::router(&ctx)).await?;
        let reply: RoutingReply = decode(LlmRole::Router, value)?;
        let decision = RoutingDecision::parse(&reply.routing_decision).ok_or_else(|| {
            CollaboratorError::malformed(
                LlmRole::Router.as_str(),
                format!("unknown routing decision '{}'", reply.routing_decision),
            )
        })?;
        Ok(RoutingAdvice {
            decision,
            confidence: reply.confidence.unwrap_or(0.5),
            reasoning: reply.reasoning,
        })
    }
}

#[async_trait]
impl NutritionPort for LlmCollaborator {
    async fn classify(&self, text: &str) -> Result<NutritionMode, CollaboratorError> {
        let reply = self
            .chat(
                LlmRole::Nutrition,
                prompts::nutrition_classifier(text),
                OutputMode::Text,
            )
            .await?
            .to_lowercase();
        if reply.contains("suggest_dish") {
            Ok(NutritionMode::SuggestDish)
        } else if reply.contains("give_advice") {
            Ok(NutritionMode::GiveAdvice)
        } else {
            Err(CollaboratorError::malformed(
                LlmRole::Nutrition.as_str(),
                format!("unexpected nutrition mode '{}'", reply.trim()),
            ))
        }
    }

    async fn suggest_dish(
        &self,
        req: NutritionRequest,
    ) -> Result<DishSuggestion, CollaboratorError> {
        let value = self
            .chat_json(LlmRole::Nutrition, prompts::suggest_dish(&req))
            .await?;
        decode(LlmRole::Nutrition, value)
    }

    async fn give_advice(&self, req: NutritionRequest) -> Result<DishAdvice, CollaboratorError> {
        let mut value = self
            .chat_json(LlmRole::Nutrition, prompts::give_advice(&req))
            .await?;
        if let Some(risk) = value.get_mut("glycemic_risk") {
            if let Some(text) = risk.as_str() {
                *risk = Value::String(text.trim().to_lowercase());
            }
        }
        decode(LlmRole::Nutrition, value)
    }
}

#[async_trait]
impl PolisherPort for LlmCollaborator {
    async fn polish(&self, req: PolishRequest) -> Result<String, CollaboratorError> {
        let reply = self
            .chat(LlmRole::Polisher, prompts::polisher(&req), OutputMode::Text)
            .await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(CollaboratorError::malformed(
                LlmRole::Polisher.as_str(),
                "empty reply",
            ));
        }
        Ok(reply.to_string())
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::llm::error::{LlmError, invalid_request};

pub type BackendId = String;

pub const DEFAULT_ROUTE_ALIAS: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialRef {
    Env { var: String },
    InlineToken { token: String },
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub auth_header: Option<String>,
}

impl ResolvedCredential {
    pub fn none() -> Self {
        Self { auth_header: None }
    }

    pub fn bearer(token: &str) -> Self {
        Self {
            auth_header: Some(format!("Bearer {token}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelProfile {
    pub id: String,
}

/// One OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendProfile {
    pub id: BackendId,
    pub endpoint: String,
    pub credential: CredentialRef,
    #[serde(default)]
    pub models: Vec<ModelProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteTarget {
    pub backend_id: BackendId,
    pub model_id: String,
}

/// The language-model jobs of the engine; each one is routed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmRole {
    Decomposer,
    Extractor,
    Narrator,
    Router,
    Nutrition,
    Polisher,
}

impl LlmRole {
    pub const ALL: [LlmRole; 6] = [
        LlmRole::Decomposer,
        LlmRole::Extractor,
        LlmRole::Narrator,
        LlmRole::Router,
        LlmRole::Nutrition,
        LlmRole::Polisher,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decomposer => "decomposer",
            Self::Extractor => "extractor",
            Self::Narrator => "narrator",
            Self::Router => "router",
            Self::Nutrition => "nutrition",
            Self::Polisher => "polisher",
        }
    }

    pub fn default_temperature(self) -> f64 {
        match self {
            Self::Polisher => 0.45,
            Self::Router => 0.2,
            Self::Nutrition => 0.0,
            Self::Decomposer | Self::Extractor | Self::Narrator => 0.1,
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    20_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub backends: Vec<BackendProfile>,
    pub route_aliases: BTreeMap<String, RouteTarget>,
    /// Alias per role; roles left out use the `default` alias.
    #[serde(default)]
    pub roles: BTreeMap<LlmRole, String>,
    #[serde(default)]
    pub temperature: BTreeMap<LlmRole, f64>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl LlmConfig {
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.backends.is_empty() {
            return Err(invalid_request("llm.backends cannot be empty"));
        }
        if !self.route_aliases.contains_key(DEFAULT_ROUTE_ALIAS) {
            return Err(invalid_request(
                "llm.route_aliases must define the 'default' alias",
            ));
        }
        for (alias, target) in &self.route_aliases {
            let backend = self.backend(&target.backend_id).ok_or_else(|| {
                invalid_request(format!(
                    "route alias '{alias}' points at unknown backend '{}'",
                    target.backend_id
                ))
            })?;
            if !backend.models.iter().any(|model| model.id == target.model_id) {
                return Err(invalid_request(format!(
                    "route alias '{alias}' points at unknown model '{}' on backend '{}'",
                    target.model_id, backend.id
                )));
            }
        }
        for (role, alias) in &self.roles {
            if !self.route_aliases.contains_key(alias) {
                return Err(invalid_request(format!(
                    "role '{}' uses unknown route alias '{alias}'",
                    role.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn backend(&self, backend_id: &str) -> Option<&BackendProfile> {
        self.backends.iter().find(|backend| backend.id == backend_id)
    }

    pub fn route_for(&self, role: LlmRole) -> Option<&RouteTarget> {
        let alias = self
            .roles
            .get(&role)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ROUTE_ALIAS);
        self.route_aliases.get(alias)
    }

    pub fn temperature_for(&self, role: LlmRole) -> f64 {
        self.temperature
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.default_temperature())
    }
}

use std::{collections::BTreeMap, fmt, future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, collaborator_unconfigured},
    types::{
        ContextAppropriateness, DiagnosisStatus, DominantFactor, Gender, HealthProfile, Intent,
        RiskLevel, RoutingDecision, Sufficiency,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{collaborator} is not configured")]
    Unconfigured { collaborator: String },
    #[error("{collaborator} is unavailable: {message}")]
    Unavailable {
        collaborator: String,
        message: String,
    },
    #[error("{collaborator} timed out after {timeout_ms}ms")]
    Timeout {
        collaborator: String,
        timeout_ms: u64,
    },
    #[error("{collaborator} returned a malformed response: {message}")]
    Malformed {
        collaborator: String,
        message: String,
    },
}

impl CollaboratorError {
    pub fn unconfigured(collaborator: impl Into<String>) -> Self {
        Self::Unconfigured {
            collaborator: collaborator.into(),
        }
    }

    pub fn unavailable(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }

    pub fn malformed(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }

    pub fn is_unconfigured(&self) -> bool {
        matches!(self, Self::Unconfigured { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub raw_text: String,
    pub current_profile: HealthProfile,
    pub current_symptoms: Vec<String>,
}

/// Field values keyed by whatever name the extractor used; values stay raw
/// (numbers or strings with unit suffixes) until the diagnosis machine
/// canonicalises them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    #[serde(default)]
    pub vars: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptKind {
    Symptom,
    Biomarker,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMatch {
    pub concept_id: String,
    #[serde(rename = "type")]
    pub kind: ConceptKind,
    #[serde(default)]
    pub relevance: Option<f64>,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetabolicFeatures {
    pub age: f64,
    pub gender: Gender,
    pub bmi: f64,
    pub waist_cm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeFacts {
    pub risk_level: RiskLevel,
    pub dominant_factor: DominantFactor,
    pub mets_ir: Option<f64>,
    pub symptom_score: Option<f64>,
    pub symptoms: Vec<String>,
    pub relevant_symptoms: Vec<String>,
    pub raised_by_symptoms: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingContext {
    pub input: String,
    pub decomposition: String,
    pub intent: Intent,
    pub previous_intent: Option<Intent>,
    pub intent_changed: bool,
    pub diagnosis_completed: bool,
    pub has_health_profile: bool,
    pub previous_interactions: usize,
    pub diagnosis_status: DiagnosisStatus,
    pub diagnosis_sufficiency: Sufficiency,
    pub nutrition_sufficiency: Sufficiency,
    pub appropriateness: ContextAppropriateness,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingAdvice {
    pub decision: RoutingDecision,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionMode {
    SuggestDish,
    GiveAdvice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionRequest {
    pub text: String,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishSuggestion {
    pub dish_name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub total_calories: f64,
    pub net_carbs: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fiber: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlycemicRisk {
    Low,
    Moderate,
    High,
}

impl fmt::Display for GlycemicRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishAdvice {
    pub advice: String,
    pub glycemic_risk: GlycemicRisk,
    #[serde(default)]
    pub improvements: Vec<String>,
    pub calorie_estimate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageIntent {
    Explain,
    Summarize,
    Warn,
    Guide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Friendly,
    Professional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolishRequest {
    pub intent: MessageIntent,
    pub tone: Tone,
    pub source_text: String,
}

#[async_trait]
pub trait DecomposerPort: Send + Sync {
    async fn decompose(&self, text: &str) -> Result<String, CollaboratorError>;

    fn is_configured(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait ExtractorPort: Send + Sync {
    async fn extract(&self, req: ExtractionRequest) -> Result<ExtractedInfo, CollaboratorError>;
}

#[async_trait]
pub trait SimilarityPort: Send + Sync {
    async fn query(&self, phrase: &str, k: usize) -> Result<Vec<ConceptMatch>, CollaboratorError>;

    fn is_configured(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait RegressionPort: Send + Sync {
    async fn predict(&self, features: MetabolicFeatures) -> Result<f64, CollaboratorError>;

    fn is_configured(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait NarrativePort: Send + Sync {
    async fn explain(&self, facts: NarrativeFacts) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait RoutingAdvisorPort: Send + Sync {
    async fn advise(&self, ctx: RoutingContext) -> Result<RoutingAdvice, CollaboratorError>;
}

#[async_trait]
pub trait NutritionPort: Send + Sync {
    async fn classify(&self, text: &str) -> Result<NutritionMode, CollaboratorError>;

    async fn suggest_dish(&self, req: NutritionRequest)
    -> Result<DishSuggestion, CollaboratorError>;

    async fn give_advice(&self, req: NutritionRequest) -> Result<DishAdvice, CollaboratorError>;
}

#[async_trait]
pub trait PolisherPort: Send + Sync {
    async fn polish(&self, req: PolishRequest) -> Result<String, CollaboratorError>;
}

/// Every external collaborator the engine talks to, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub decomposer: Arc<dyn DecomposerPort>,
    pub extractor: Arc<dyn ExtractorPort>,
    pub similarity: Arc<dyn SimilarityPort>,
    pub regression: Arc<dyn RegressionPort>,
    pub narrator: Arc<dyn NarrativePort>,
    pub router: Arc<dyn RoutingAdvisorPort>,
    pub nutrition: Arc<dyn NutritionPort>,
    pub polisher: Arc<dyn PolisherPort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub llm_configured: bool,
    pub similarity_configured: bool,
    pub regression_configured: bool,
}

impl Collaborators {
    pub fn setup_report(&self) -> SetupReport {
        SetupReport {
            llm_configured: self.decomposer.is_configured(),
            similarity_configured: self.similarity.is_configured(),
            regression_configured: self.regression.is_configured(),
        }
    }
}

/// How a collaborator failure is treated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// An unconfigured collaborator aborts the turn; other failures degrade.
    LanguageModel,
    /// Every failure degrades to the caller's fallback.
    Auxiliary,
}

/// Runs one collaborator call under a deadline.
///
/// `Ok(None)` means the call failed in a recoverable way and the caller
/// should apply its fallback; the failure has already been logged.
pub async fn invoke_guarded<T, F>(
    collaborator: &'static str,
    criticality: Criticality,
    deadline: Duration,
    call: F,
) -> Result<Option<T>, EngineError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    let err = match tokio::time::timeout(deadline, call).await {
        Ok(Ok(value)) => return Ok(Some(value)),
        Ok(Err(err)) => err,
        Err(_) => CollaboratorError::Timeout {
            collaborator: collaborator.to_string(),
            timeout_ms: deadline.as_millis() as u64,
        },
    };

    if err.is_unconfigured() && criticality == Criticality::LanguageModel {
        tracing::error!(
            target: "orchestrator",
            collaborator = collaborator,
            error = %err,
            "collaborator_unconfigured"
        );
        return Err(collaborator_unconfigured(err.to_string()));
    }

    tracing::warn!(
        target: "orchestrator",
        collaborator = collaborator,
        error = %err,
        "collaborator_fallback"
    );
    Ok(None)
}

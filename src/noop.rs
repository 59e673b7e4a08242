use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::{
    CollaboratorError, Collaborators, ConceptMatch, DecomposerPort, DishAdvice, DishSuggestion,
    ExtractedInfo, ExtractionRequest, ExtractorPort, MetabolicFeatures, NarrativeFacts,
    NarrativePort, NutritionMode, NutritionPort, NutritionRequest, PolishRequest, PolisherPort,
    RegressionPort, RoutingAdvice, RoutingAdvisorPort, RoutingContext, SimilarityPort,
};

const LANGUAGE_MODEL: &str = "language model";

/// Stands in for every language-model collaborator when no `llm` section is configured.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredLanguageModel;

#[async_trait]
impl DecomposerPort for UnconfiguredLanguageModel {
    async fn decompose(&self, _text: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[async_trait]
impl ExtractorPort for UnconfiguredLanguageModel {
    async fn extract(&self, _req: ExtractionRequest) -> Result<ExtractedInfo, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }
}

#[async_trait]
impl NarrativePort for UnconfiguredLanguageModel {
    async fn explain(&self, _facts: NarrativeFacts) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }
}

#[async_trait]
impl RoutingAdvisorPort for UnconfiguredLanguageModel {
    async fn advise(&self, _ctx: RoutingContext) -> Result<RoutingAdvice, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }
}

#[async_trait]
impl NutritionPort for UnconfiguredLanguageModel {
    async fn classify(&self, _text: &str) -> Result<NutritionMode, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }

    async fn suggest_dish(
        &self,
        _req: NutritionRequest,
    ) -> Result<DishSuggestion, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }

    async fn give_advice(&self, _req: NutritionRequest) -> Result<DishAdvice, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }
}

#[async_trait]
impl PolisherPort for UnconfiguredLanguageModel {
    async fn polish(&self, _req: PolishRequest) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::unconfigured(LANGUAGE_MODEL))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnconfiguredSimilarity;

#[async_trait]
impl SimilarityPort for UnconfiguredSimilarity {
    async fn query(
        &self,
        _phrase: &str,
        _k: usize,
    ) -> Result<Vec<ConceptMatch>, CollaboratorError> {
        Err(CollaboratorError::unconfigured("similarity lookup"))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnconfiguredRegression;

#[async_trait]
impl RegressionPort for UnconfiguredRegression {
    async fn predict(&self, _features: MetabolicFeatures) -> Result<f64, CollaboratorError> {
        Err(CollaboratorError::unconfigured("regression model"))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

impl Collaborators {
    /// Language model from `llm`, everything else unconfigured.
    pub fn language_model_only<L>(llm: Arc<L>) -> Self
    where
        L: DecomposerPort
            + ExtractorPort
            + NarrativePort
            + RoutingAdvisorPort
            + NutritionPort
            + PolisherPort
            + 'static,
    {
        Self {
            decomposer: llm.clone(),
            extractor: llm.clone(),
            similarity: Arc::new(UnconfiguredSimilarity),
            regression: Arc::new(UnconfiguredRegression),
            narrator: llm.clone(),
            router: llm.clone(),
            nutrition: llm.clone(),
            polisher: llm,
        }
    }

    pub fn unconfigured() -> Self {
        Self::language_model_only(Arc::new(UnconfiguredLanguageModel))
    }
}

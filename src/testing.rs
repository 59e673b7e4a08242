//! Scripted collaborator doubles for driving the engine without any backend.
//!
//! Every hook defaults to a recoverable failure, so an unscripted
//! collaborator exercises its fallback path.

use std::{future::Future, pin::Pin, sync::Arc};

use async_trait::async_trait;

use crate::ports::{
    CollaboratorError, Collaborators, ConceptMatch, DecomposerPort, DishAdvice, DishSuggestion,
    ExtractedInfo, ExtractionRequest, ExtractorPort, MetabolicFeatures, NarrativeFacts,
    NarrativePort, NutritionMode, NutritionPort, NutritionRequest, PolishRequest, PolisherPort,
    RegressionPort, RoutingAdvice, RoutingAdvisorPort, RoutingContext, SimilarityPort,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityQuery {
    pub phrase: String,
    pub k: usize,
}

type HookFuture<T> = Pin<Box<dyn Future<Output = Result<T, CollaboratorError>> + Send>>;

pub type DecomposeHook = Arc<dyn Fn(String) -> HookFuture<String> + Send + Sync>;
pub type ExtractHook = Arc<dyn Fn(ExtractionRequest) -> HookFuture<ExtractedInfo> + Send + Sync>;
pub type SimilarityHook =
    Arc<dyn Fn(SimilarityQuery) -> HookFuture<Vec<ConceptMatch>> + Send + Sync>;
pub type RegressionHook = Arc<dyn Fn(MetabolicFeatures) -> HookFuture<f64> + Send + Sync>;
pub type NarrateHook = Arc<dyn Fn(NarrativeFacts) -> HookFuture<String> + Send + Sync>;
pub type RouteHook = Arc<dyn Fn(RoutingContext) -> HookFuture<RoutingAdvice> + Send + Sync>;
pub type ClassifyNutritionHook = Arc<dyn Fn(String) -> HookFuture<NutritionMode> + Send + Sync>;
pub type SuggestDishHook =
    Arc<dyn Fn(NutritionRequest) -> HookFuture<DishSuggestion> + Send + Sync>;
pub type GiveAdviceHook = Arc<dyn Fn(NutritionRequest) -> HookFuture<DishAdvice> + Send + Sync>;
pub type PolishHook = Arc<dyn Fn(PolishRequest) -> HookFuture<String> + Send + Sync>;

pub fn boxed<T>(
    future: impl Future<Output = T> + Send + 'static,
) -> Pin<Box<dyn Future<Output = T> + Send>>
where
    T: Send + 'static,
{
    Box::pin(future)
}

fn unscripted<Req, T>(collaborator: &'static str) -> Arc<dyn Fn(Req) -> HookFuture<T> + Send + Sync>
where
    Req: 'static,
    T: Send + 'static,
{
    Arc::new(move |_: Req| -> HookFuture<T> {
        boxed(async move {
            Err::<T, _>(CollaboratorError::unavailable(
                collaborator,
                "no scripted response",
            ))
        })
    })
}

fn hook<Req, T, F, Fut>(f: F) -> Arc<dyn Fn(Req) -> HookFuture<T> + Send + Sync>
where
    Req: 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, CollaboratorError>> + Send + 'static,
    T: Send + 'static,
{
    Arc::new(move |req: Req| -> HookFuture<T> { boxed(f(req)) })
}

#[derive(Clone)]
pub struct ScriptedCollaborators {
    pub decompose: DecomposeHook,
    pub extract: ExtractHook,
    pub similarity: SimilarityHook,
    pub regression: RegressionHook,
    pub narrate: NarrateHook,
    pub route: RouteHook,
    pub classify_nutrition: ClassifyNutritionHook,
    pub suggest_dish: SuggestDishHook,
    pub give_advice: GiveAdviceHook,
    pub polish: PolishHook,
}

impl Default for ScriptedCollaborators {
    fn default() -> Self {
        Self {
            decompose: unscripted("decomposer"),
            extract: unscripted("extractor"),
            similarity: unscripted("similarity"),
            regression: unscripted("regression"),
            narrate: unscripted("narrator"),
            route: unscripted("router"),
            classify_nutrition: unscripted("nutrition_classifier"),
            suggest_dish: unscripted("nutrition"),
            give_advice: unscripted("nutrition"),
            polish: unscripted("polisher"),
        }
    }
}

impl ScriptedCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decompose<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, CollaboratorError>> + Send + 'static,
    {
        self.decompose = hook(f);
        self
    }

    pub fn with_extract<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ExtractionRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ExtractedInfo, CollaboratorError>> + Send + 'static,
    {
        self.extract = hook(f);
        self
    }

    pub fn with_similarity<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(SimilarityQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<ConceptMatch>, CollaboratorError>> + Send + 'static,
    {
        self.similarity = hook(f);
        self
    }

    pub fn with_regression<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MetabolicFeatures) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<f64, CollaboratorError>> + Send + 'static,
    {
        self.regression = hook(f);
        self
    }

    pub fn with_narrate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(NarrativeFacts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, CollaboratorError>> + Send + 'static,
    {
        self.narrate = hook(f);
        self
    }

    pub fn with_route<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RoutingContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RoutingAdvice, CollaboratorError>> + Send + 'static,
    {
        self.route = hook(f);
        self
    }

    pub fn with_classify_nutrition<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<NutritionMode, CollaboratorError>> + Send + 'static,
    {
        self.classify_nutrition = hook(f);
        self
    }

    pub fn with_suggest_dish<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(NutritionRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<DishSuggestion, CollaboratorError>> + Send + 'static,
    {
        self.suggest_dish = hook(f);
        self
    }

    pub fn with_give_advice<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(NutritionRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<DishAdvice, CollaboratorError>> + Send + 'static,
    {
        self.give_advice = hook(f);
        self
    }

    pub fn with_polish<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(PolishRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, CollaboratorError>> + Send + 'static,
    {
        self.polish = hook(f);
        self
    }

    pub fn into_collaborators(self) -> Collaborators {
        let scripted = Arc::new(self);
        Collaborators {
            decomposer: scripted.clone(),
            extractor: scripted.clone(),
            similarity: scripted.clone(),
            regression: scripted.clone(),
            narrator: scripted.clone(),
            router: scripted.clone(),
            nutrition: scripted.clone(),
            polisher: scripted,
        }
    }
}

#[async_trait]
impl DecomposerPort for ScriptedCollaborators {
    async fn decompose(&self, text: &str) -> Result<String, CollaboratorError> {
        (self.decompose)(text.to_string()).await
    }
}

#[async_trait]
impl ExtractorPort for ScriptedCollaborators {
    async fn extract(&self, req: ExtractionRequest) -> Result<ExtractedInfo, CollaboratorError> {
        (self.extract)(req).await
    }
}

#[async_trait]
impl SimilarityPort for ScriptedCollaborators {
    async fn query(&self, phrase: &str, k: usize) -> Result<Vec<ConceptMatch>, CollaboratorError> {
        (self.similarity)(SimilarityQuery {
            phrase: phrase.to_string(),
            k,
        })
        .await
    }
}

#[async_trait]
impl RegressionPort for ScriptedCollaborators {
    async fn predict(&self, features: MetabolicFeatures) -> Result<f64, CollaboratorError> {
        (self.regression)(features).await
    }
}

#[async_trait]
impl NarrativePort for ScriptedCollaborators {
    async fn explain(&self, facts: NarrativeFacts) -> Result<String, CollaboratorError> {
        (self.narrate)(facts).await
    }
}

#[async_trait]
impl RoutingAdvisorPort for ScriptedCollaborators {
    async fn advise(&self, ctx: RoutingContext) -> Result<RoutingAdvice, CollaboratorError> {
        (self.route)(ctx).await
    }
}

#[async_trait]
impl NutritionPort for ScriptedCollaborators {
    async fn classify(&self, text: &str) -> Result<NutritionMode, CollaboratorError> {
        (self.classify_nutrition)(text.to_string()).await
    }

    async fn suggest_dish(
        &self,
        req: NutritionRequest,
    ) -> Result<DishSuggestion, CollaboratorError> {
        (self.suggest_dish)(req).await
    }

    async fn give_advice(&self, req: NutritionRequest) -> Result<DishAdvice, CollaboratorError> {
        (self.give_advice)(req).await
    }
}

#[async_trait]
impl PolisherPort for ScriptedCollaborators {
    async fn polish(&self, req: PolishRequest) -> Result<String, CollaboratorError> {
        (self.polish)(req).await
    }
}

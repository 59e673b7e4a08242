//! Dietary guidance branch: suggest an adapted dish or advise on one.

use std::{sync::Arc, time::Duration};

use crate::{
    error::EngineError,
    ports::{
        Criticality, DishAdvice, DishSuggestion, NutritionMode, NutritionPort, NutritionRequest,
        invoke_guarded,
    },
    types::RiskLevel,
};

const SUGGESTION_TRIGGERS: &[&str] = &[
    "give me",
    "suggest",
    "recommend",
    "dish",
    "idea",
    "for my case",
    "adapt",
    "version",
    "cool",
    "healthier",
];

const ADVICE_TRIGGERS: &[&str] = &[
    "is it ok",
    "should i",
    "advice",
    "healthy",
    "bad for me",
    "good for me",
];

pub const GUIDELINE_FALLBACK: &str = "ADVICE: Favor low glycemic meals built around vegetables, lean protein and \
fiber, keep net carbs under about 30g per meal, and avoid refined carbs and added sugar.";

pub fn render_suggestion(suggestion: &DishSuggestion) -> String {
    format!(
        "SUGGESTION: {} ({} cal, {}g net carbs) - {}",
        suggestion.dish_name, suggestion.total_calories, suggestion.net_carbs, suggestion.reason
    )
}

pub fn render_advice(advice: &DishAdvice) -> String {
    format!(
        "ADVICE: {} (glycemic risk: {}, ~{} cal)",
        advice.advice, advice.glycemic_risk, advice.calorie_estimate
    )
}

/// Decides the mode from trigger phrases alone; `None` when neither set matches.
pub fn classify_by_triggers(text: &str) -> Option<NutritionMode> {
    let text = text.to_lowercase();
    if SUGGESTION_TRIGGERS.iter().any(|t| text.contains(t)) {
        Some(NutritionMode::SuggestDish)
    } else if ADVICE_TRIGGERS.iter().any(|t| text.contains(t)) {
        Some(NutritionMode::GiveAdvice)
    } else {
        None
    }
}

pub struct NutritionBranch {
    nutrition: Arc<dyn NutritionPort>,
    timeout: Duration,
}

impl NutritionBranch {
    pub fn new(nutrition: Arc<dyn NutritionPort>, timeout: Duration) -> Self {
        Self { nutrition, timeout }
    }

    pub async fn run(
        &self,
        text: &str,
        risk_level: Option<RiskLevel>,
    ) -> Result<String, EngineError> {
        let mode = match classify_by_triggers(text) {
            Some(mode) => mode,
            None => invoke_guarded(
                "nutrition_classifier",
                Criticality::LanguageModel,
                self.timeout,
                self.nutrition.classify(text),
            )
            .await?
            .unwrap_or(NutritionMode::GiveAdvice),
        };

        let request = NutritionRequest {
            text: text.to_string(),
            risk_level,
        };
        let rendered = match mode {
            NutritionMode::SuggestDish => invoke_guarded(
                "nutrition",
                Criticality::LanguageModel,
                self.timeout,
                self.nutrition.suggest_dish(request),
            )
            .await?
            .map(|suggestion| render_suggestion(&suggestion)),
            NutritionMode::GiveAdvice => invoke_guarded(
                "nutrition",
                Criticality::LanguageModel,
                self.timeout,
                self.nutrition.give_advice(request),
            )
            .await?
            .map(|advice| render_advice(&advice)),
        };

        tracing::info!(
            target: "orchestrator",
            mode = ?mode,
            fallback = rendered.is_none(),
            "nutrition_completed"
        );
        Ok(rendered.unwrap_or_else(|| GUIDELINE_FALLBACK.to_string()))
    }
}

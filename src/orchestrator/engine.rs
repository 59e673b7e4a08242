use std::{collections::BTreeMap, sync::Arc};

use crate::{
    classifier::{Classification, TableRoute, classify, route_by_table},
    config::EngineConfig,
    diagnosis::{DiagnosisMachine, DiagnosisOutcome},
    error::{EngineError, invalid_request},
    nutrition::NutritionBranch,
    orchestrator::{
        finalize::{compose_source, polish_style, unpolished},
        state::{MemoryRouting, TurnState},
    },
    ports::{Collaborators, Criticality, PolishRequest, RoutingContext, SetupReport, invoke_guarded},
    session::{ConversationMemory, InteractionRecord, SessionStore, SessionSummary},
    types::{DiagnosisStatus, Intent, RoutingDecision},
};

pub const APOLOGY: &str = "I'm sorry, I can't answer right now because the assistant is not fully \
configured. Please try again later.";

pub const TABLE_CONFIDENCE: f64 = 0.8;
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Decompose,
    RouteByMemory,
    Diagnosis,
    Nutrition,
    Finalize,
    Done,
}

/// Drives one turn: decompose, route, run the chosen branch, finalize.
///
/// Session memory is checked out for the whole turn and committed only when
/// the turn succeeds, so an aborted turn leaves memory untouched.
pub struct Orchestrator {
    collaborators: Collaborators,
    sessions: Arc<SessionStore>,
    diagnosis: DiagnosisMachine,
    nutrition: NutritionBranch,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> Self {
        Self::with_sessions(collaborators, config, Arc::new(SessionStore::new()))
    }

    pub fn with_sessions(
        collaborators: Collaborators,
        config: EngineConfig,
        sessions: Arc<SessionStore>,
    ) -> Self {
        let diagnosis = DiagnosisMachine::new(&collaborators, config.diagnosis_settings());
        let nutrition = NutritionBranch::new(
            Arc::clone(&collaborators.nutrition),
            config.collaborator_timeout(),
        );
        Self {
            collaborators,
            sessions,
            diagnosis,
            nutrition,
            config,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn validate(&self) -> SetupReport {
        self.collaborators.setup_report()
    }

    pub async fn summary(&self, session_id: &str) -> SessionSummary {
        self.sessions.summary(session_id).await
    }

    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.evict(session_id).await
    }

    /// Runs a turn and always yields text for the user.
    pub async fn respond(&self, session_id: &str, input: &str) -> String {
        match self.handle_turn(session_id, input).await {
            Ok(turn) => turn.final_response,
            Err(err) => {
                tracing::error!(
                    target: "orchestrator",
                    session_id = session_id,
                    kind = ?err.kind,
                    error = %err,
                    "turn_aborted"
                );
                APOLOGY.to_string()
            }
        }
    }

    #[tracing::instrument(
        name = "orchestrator_turn",
        target = "orchestrator",
        skip(self, input),
        fields(session_id = %session_id, input_chars = input.len())
    )]
    pub async fn handle_turn(
        &self,
        session_id: &str,
        input: &str,
    ) -> Result<TurnState, EngineError> {
        if session_id.trim().is_empty() {
            return Err(invalid_request("session id cannot be empty"));
        }

        let lease = self.sessions.checkout(session_id).await;
        let mut memory = lease.memory().clone();
        let mut turn = TurnState {
            session_id: session_id.to_string(),
            inquiry: input.to_string(),
            decomposition: String::new(),
            diagnosis_result: None,
            diagnosis_question: None,
            nutrition_result: None,
            final_response: String::new(),
            subgraph_results: BTreeMap::new(),
            routing: MemoryRouting {
                intent: Intent::General,
                previous_intent: memory.previous_intent(),
                intent_changed: false,
                diagnosis_status: DiagnosisStatus::None,
                routing_decision: RoutingDecision::Finalize,
                confidence: 0.0,
                reasoning: String::new(),
                guidance_message: None,
            },
        };
        tracing::info!(
            target: "orchestrator",
            conversation_turns = memory.history.len(),
            "turn_started"
        );

        let mut stage = Stage::Decompose;
        while stage != Stage::Done {
            stage = match stage {
                Stage::Decompose => {
                    turn.decomposition = invoke_guarded(
                        "decomposer",
                        Criticality::LanguageModel,
                        self.config.collaborator_timeout(),
                        self.collaborators.decomposer.decompose(input),
                    )
                    .await?
                    .unwrap_or_default();
                    Stage::RouteByMemory
                }
                Stage::RouteByMemory => {
                    turn.routing = self.route(&turn, &memory).await?;
                    match turn.routing.routing_decision {
                        RoutingDecision::Diagnosis => Stage::Diagnosis,
                        RoutingDecision::Nutrition => Stage::Nutrition,
                        RoutingDecision::Finalize => Stage::Finalize,
                    }
                }
                Stage::Diagnosis => self.run_diagnosis(&mut turn, &mut memory).await?,
                Stage::Nutrition => {
                    let risk_level = memory
                        .last_diagnosis_result
                        .as_ref()
                        .map(|report| report.risk_level);
                    let result = self.nutrition.run(turn.inquiry.trim(), risk_level).await?;
                    turn.subgraph_results.insert(
                        "nutrition".to_string(),
                        serde_json::Value::String(result.clone()),
                    );
                    turn.nutrition_result = Some(result);
                    Stage::Finalize
                }
                Stage::Finalize => {
                    turn.final_response = self.finalize(&turn, &memory).await?;
                    Stage::Done
                }
                Stage::Done => Stage::Done,
            };
        }

        let limits = self.config.memory_limits();
        memory.record_interaction(
            InteractionRecord::now(input, turn.routing.intent, turn.routing.routing_decision),
            limits,
        );
        memory.record_intent(turn.routing.intent, limits);
        lease.commit(memory);

        tracing::info!(
            target: "orchestrator",
            intent = %turn.routing.intent,
            routing_decision = %turn.routing.routing_decision,
            diagnosed = turn.diagnosis_result.is_some(),
            asked = turn.diagnosis_question.is_some(),
            nutrition = turn.nutrition_result.is_some(),
            "turn_committed"
        );
        Ok(turn)
    }

    async fn route(
        &self,
        turn: &TurnState,
        memory: &ConversationMemory,
    ) -> Result<MemoryRouting, EngineError> {
        let classification = classify(&turn.decomposition, &turn.inquiry, memory, false);
        let previous_intent = memory.previous_intent();
        let intent_changed = previous_intent.is_some_and(|previous| previous != classification.intent);

        let (routing_decision, confidence, reasoning, guidance_message) =
            match route_by_table(&classification, memory) {
                TableRoute::Decided {
                    decision,
                    guidance,
                    reasoning,
                } => (
                    decision,
                    TABLE_CONFIDENCE,
                    reasoning.to_string(),
                    guidance.map(str::to_string),
                ),
                TableRoute::Deferred => {
                    let advice = invoke_guarded(
                        "router",
                        Criticality::LanguageModel,
                        self.config.collaborator_timeout(),
                        self.collaborators.router.advise(routing_context(
                            turn,
                            memory,
                            &classification,
                            previous_intent,
                            intent_changed,
                        )),
                    )
                    .await?;
                    match advice {
                        Some(advice) => (
                            advice.decision,
                            if advice.confidence.is_finite() {
                                advice.confidence.clamp(0.0, 1.0)
                            } else {
                                FALLBACK_CONFIDENCE
                            },
                            advice.reasoning,
                            None,
                        ),
                        None => (
                            RoutingDecision::Finalize,
                            FALLBACK_CONFIDENCE,
                            "Fallback to finalize after routing collaborator failure".to_string(),
                            None,
                        ),
                    }
                }
            };

        tracing::info!(
            target: "orchestrator",
            intent = %classification.intent,
            diagnosis_status = ?classification.diagnosis_status,
            diagnosis_sufficiency = ?classification.sufficiency.diagnosis,
            nutrition_sufficiency = ?classification.sufficiency.nutrition,
            appropriateness = ?classification.appropriateness,
            routing_decision = %routing_decision,
            confidence = confidence,
            guided = guidance_message.is_some(),
            "route_selected"
        );

        Ok(MemoryRouting {
            intent: classification.intent,
            previous_intent,
            intent_changed,
            diagnosis_status: classification.diagnosis_status,
            routing_decision,
            confidence,
            reasoning,
            guidance_message,
        })
    }

    async fn run_diagnosis(
        &self,
        turn: &mut TurnState,
        memory: &mut ConversationMemory,
    ) -> Result<Stage, EngineError> {
        let run = self
            .diagnosis
            .run(&turn.inquiry, &memory.health_profile, &memory.diagnosis_context)
            .await?;
        memory.health_profile = run.profile();
        let outcome = run.outcome;
        memory.diagnosis_context = run.state.into_context();

        match outcome {
            DiagnosisOutcome::Question { prompt, .. } => {
                turn.routing.guidance_message = Some(prompt.clone());
                turn.diagnosis_question = Some(prompt);
                Ok(Stage::Finalize)
            }
            DiagnosisOutcome::Report(report) => {
                turn.diagnosis_result = Some(report.render());
                if let Ok(value) = serde_json::to_value(&report) {
                    turn.subgraph_results.insert("diagnosis".to_string(), value);
                }
                memory.diagnosis_completed = true;
                memory.last_diagnosis_result = Some(report);

                let continue_to_nutrition =
                    matches!(turn.routing.intent, Intent::Nutrition | Intent::General)
                        || turn.routing.confidence
                            < self.config.continue_to_nutrition_below_confidence;
                Ok(if continue_to_nutrition {
                    Stage::Nutrition
                } else {
                    Stage::Finalize
                })
            }
        }
    }

    async fn finalize(
        &self,
        turn: &TurnState,
        memory: &ConversationMemory,
    ) -> Result<String, EngineError> {
        if let Some(guidance) = &turn.routing.guidance_message {
            return Ok(guidance.clone());
        }

        let remembered = (turn.routing.intent == Intent::Followup)
            .then(|| memory.last_diagnosis_result.as_ref().map(|report| report.render()))
            .flatten();
        let diagnosis = turn.diagnosis_result.clone().or(remembered);
        let nutrition = turn.nutrition_result.as_deref();

        let (intent, tone) = polish_style(turn.routing.intent);
        let polished = invoke_guarded(
            "polisher",
            Criticality::LanguageModel,
            self.config.collaborator_timeout(),
            self.collaborators.polisher.polish(PolishRequest {
                intent,
                tone,
                source_text: compose_source(diagnosis.as_deref(), nutrition),
            }),
        )
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

        Ok(polished.unwrap_or_else(|| unpolished(diagnosis.as_deref(), nutrition)))
    }
}

fn routing_context(
    turn: &TurnState,
    memory: &ConversationMemory,
    classification: &Classification,
    previous_intent: Option<Intent>,
    intent_changed: bool,
) -> RoutingContext {
    RoutingContext {
        input: turn.inquiry.clone(),
        decomposition: turn.decomposition.clone(),
        intent: classification.intent,
        previous_intent,
        intent_changed,
        diagnosis_completed: memory.diagnosis_completed,
        has_health_profile: !memory.health_profile.is_empty(),
        previous_interactions: memory.history.len(),
        diagnosis_status: classification.diagnosis_status,
        diagnosis_sufficiency: classification.sufficiency.diagnosis,
        nutrition_sufficiency: classification.sufficiency.nutrition,
        appropriateness: classification.appropriateness,
    }
}

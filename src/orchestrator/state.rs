use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{DiagnosisStatus, Intent, RoutingDecision, SessionId};

/// How the turn was routed, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryRouting {
    pub intent: Intent,
    pub previous_intent: Option<Intent>,
    pub intent_changed: bool,
    pub diagnosis_status: DiagnosisStatus,
    pub routing_decision: RoutingDecision,
    pub confidence: f64,
    pub reasoning: String,
    /// Surfaced verbatim as the reply when present.
    pub guidance_message: Option<String>,
}

/// Everything one turn produced; discarded once the reply is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnState {
    pub session_id: SessionId,
    pub inquiry: String,
    pub decomposition: String,
    pub diagnosis_result: Option<String>,
    pub diagnosis_question: Option<String>,
    pub nutrition_result: Option<String>,
    pub final_response: String,
    pub subgraph_results: BTreeMap<String, serde_json::Value>,
    pub routing: MemoryRouting,
}

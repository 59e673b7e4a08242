mod branches;
mod failures;

use std::sync::Arc;

use nutrisense::{
    config::EngineConfig,
    orchestrator::Orchestrator,
    session::{ConversationMemory, SessionStore},
    testing::ScriptedCollaborators,
    types::{Gender, HealthProfile},
};

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        collaborator_timeout_ms: 500,
        ..EngineConfig::default()
    }
}

pub fn orchestrator(scripted: ScriptedCollaborators) -> Orchestrator {
    Orchestrator::new(scripted.into_collaborators(), engine_config())
}

/// Orchestrator whose session `session_id` already holds `memory`.
pub async fn seeded_orchestrator(
    scripted: ScriptedCollaborators,
    session_id: &str,
    memory: ConversationMemory,
) -> Orchestrator {
    let sessions = Arc::new(SessionStore::new());
    sessions.checkout(session_id).await.commit(memory);
    Orchestrator::with_sessions(scripted.into_collaborators(), engine_config(), sessions)
}

pub fn complete_profile() -> HealthProfile {
    HealthProfile {
        age: Some(58.0),
        weight_kg: Some(104.0),
        height_m: Some(1.7),
        waist_cm: Some(118.0),
        gender: Some(Gender::Male),
    }
}

pub fn decomposing_to(text: &'static str) -> ScriptedCollaborators {
    ScriptedCollaborators::new().with_decompose(move |_| async move { Ok(text.to_string()) })
}

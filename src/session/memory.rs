use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::types::{DiagnosisReport, HealthProfile, Intent, RoutingDecision};

pub const DEFAULT_MAX_HISTORY: usize = 10;
pub const DEFAULT_MAX_INTENT_HISTORY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimits {
    pub max_history: usize,
    pub max_intent_history: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            max_intent_history: DEFAULT_MAX_INTENT_HISTORY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub input: String,
    pub intent: Intent,
    pub routing_decision: RoutingDecision,
    pub timestamp: String,
}

impl InteractionRecord {
    pub fn now(input: impl Into<String>, intent: Intent, routing_decision: RoutingDecision) -> Self {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            input: input.into(),
            intent,
            routing_decision,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Demographics,
    Symptoms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionLedgerEntry {
    pub question_type: QuestionType,
    pub times_asked: u32,
}

/// Ordered log of clarifying questions issued in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionLedger {
    entries: Vec<QuestionLedgerEntry>,
}

impl QuestionLedger {
    pub fn times_asked(&self, question_type: QuestionType) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.question_type == question_type)
            .count() as u32
    }

    pub fn record(&mut self, question_type: QuestionType) -> u32 {
        let times_asked = self.times_asked(question_type) + 1;
        self.entries.push(QuestionLedgerEntry {
            question_type,
            times_asked,
        });
        times_asked
    }

    pub fn entries(&self) -> &[QuestionLedgerEntry] {
        &self.entries
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisContext {
    pub symptoms: Vec<String>,
    pub question_ledger: QuestionLedger,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMemory {
    pub diagnosis_completed: bool,
    pub last_diagnosis_result: Option<DiagnosisReport>,
    pub health_profile: HealthProfile,
    pub history: VecDeque<InteractionRecord>,
    pub intent_history: VecDeque<Intent>,
    pub diagnosis_context: DiagnosisContext,
}

impl ConversationMemory {
    pub fn record_interaction(&mut self, record: InteractionRecord, limits: MemoryLimits) {
        self.history.push_back(record);
        while self.history.len() > limits.max_history {
            self.history.pop_front();
        }
    }

    pub fn record_intent(&mut self, intent: Intent, limits: MemoryLimits) {
        self.intent_history.push_back(intent);
        while self.intent_history.len() > limits.max_intent_history {
            self.intent_history.pop_front();
        }
    }

    pub fn previous_intent(&self) -> Option<Intent> {
        self.intent_history.back().copied()
    }

    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn summary(&self) -> SessionSummary {
        let skip = self.intent_history.len().saturating_sub(RECENT_INTENTS);
        SessionSummary {
            diagnosis_completed: self.diagnosis_completed,
            health_profile_completeness: self.health_profile.present_count(),
            conversation_turns: self.history.len(),
            recent_intents: self.intent_history.iter().skip(skip).copied().collect(),
            last_diagnosis: self.last_diagnosis_result.clone(),
        }
    }
}

const RECENT_INTENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub diagnosis_completed: bool,
    pub health_profile_completeness: usize,
    pub conversation_turns: usize,
    pub recent_intents: Vec<Intent>,
    pub last_diagnosis: Option<DiagnosisReport>,
}

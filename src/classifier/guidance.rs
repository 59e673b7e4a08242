use crate::{
    classifier::Classification,
    session::ConversationMemory,
    types::{ContextAppropriateness, DiagnosisStatus, Intent, RoutingDecision, Sufficiency},
};

pub const SCOPE_EXPLANATION: &str = "I'm specialized in insulin resistance health assessment and nutrition guidance. \
I can help with health risk evaluation, symptom analysis, dietary advice, and general questions about \
insulin resistance and metabolic health. I'm not able to assist with topics outside of health and nutrition.";

pub const FIELD_REQUEST: &str = "I'd love to help with your health assessment! To provide accurate insulin resistance \
risk evaluation, I need some basic information about you. Please share: your age, weight, height, waist \
circumference, and gender. You can also mention any symptoms you're experiencing like fatigue, thirst, \
frequent urination, or vision changes.";

pub const NUTRITION_PROFILE_REQUEST: &str = "I can provide nutrition guidance for insulin resistance! However, to give \
you the most relevant dietary advice, it would be helpful to know a bit about your health profile first. You can \
share your age, weight, activity level, or any health conditions. Alternatively, you can ask general questions \
about insulin-resistant friendly foods, meal ideas, or dietary principles.";

pub const CAPABILITY_SUMMARY: &str = "I'm here to help! I specialize in insulin resistance health assessment and \
nutrition guidance. You can ask me to:\n\
• Assess your insulin resistance risk (share your age, weight, height, waist size)\n\
• Analyze symptoms (fatigue, thirst, vision changes, etc.)\n\
• Suggest healthy meals and dietary advice\n\
• Explain insulin resistance and metabolic health concepts\n\
What would you like to know about?";

pub const GENERAL_CAPABILITY_SUMMARY: &str = "I'm your insulin resistance health assistant! I can help you with:\n\
• Health risk assessment and symptom analysis\n\
• Personalized nutrition and meal suggestions\n\
• Education about insulin resistance and metabolic health\n\
• Dietary guidance for better blood sugar management\n\n\
What specific aspect of insulin resistance or metabolic health would you like to explore?";

#[derive(Debug, Clone, PartialEq)]
pub enum TableRoute {
    Decided {
        decision: RoutingDecision,
        guidance: Option<&'static str>,
        reasoning: &'static str,
    },
    /// Not covered by the table; a routing collaborator decides.
    Deferred,
}

fn decided(
    decision: RoutingDecision,
    guidance: Option<&'static str>,
    reasoning: &'static str,
) -> TableRoute {
    TableRoute::Decided {
        decision,
        guidance,
        reasoning,
    }
}

pub fn route_by_table(classification: &Classification, memory: &ConversationMemory) -> TableRoute {
    if classification.appropriateness == ContextAppropriateness::OutOfContext {
        return decided(
            RoutingDecision::Finalize,
            Some(SCOPE_EXPLANATION),
            "Question is outside health and nutrition scope",
        );
    }

    match classification.intent {
        Intent::Health => match classification.sufficiency.diagnosis {
            Sufficiency::Insufficient => decided(
                RoutingDecision::Finalize,
                Some(FIELD_REQUEST),
                "Health intent without enough profile data",
            ),
            Sufficiency::Partial => decided(
                RoutingDecision::Diagnosis,
                None,
                "Proceeding with partial health data",
            ),
            Sufficiency::Sufficient => decided(
                RoutingDecision::Diagnosis,
                None,
                "Sufficient data for health assessment",
            ),
        },
        Intent::Nutrition => match classification.sufficiency.nutrition {
            Sufficiency::Insufficient => decided(
                RoutingDecision::Finalize,
                Some(NUTRITION_PROFILE_REQUEST),
                "Nutrition intent without any profile context",
            ),
            Sufficiency::Partial | Sufficiency::Sufficient => decided(
                RoutingDecision::Nutrition,
                None,
                "Providing nutrition guidance",
            ),
        },
        Intent::Followup => {
            if classification.diagnosis_status == DiagnosisStatus::None && !memory.has_history() {
                decided(
                    RoutingDecision::Finalize,
                    Some(CAPABILITY_SUMMARY),
                    "Follow-up without prior context",
                )
            } else {
                decided(
                    RoutingDecision::Finalize,
                    None,
                    "Answering follow-up question with context",
                )
            }
        }
        Intent::General => {
            if classification.appropriateness == ContextAppropriateness::Unclear {
                decided(
                    RoutingDecision::Finalize,
                    Some(GENERAL_CAPABILITY_SUMMARY),
                    "General message with unclear scope",
                )
            } else {
                decided(
                    RoutingDecision::Finalize,
                    None,
                    "Handling general health question",
                )
            }
        }
        Intent::OutOfContext => TableRoute::Deferred,
    }
}

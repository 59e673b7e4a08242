//! Chat prompts for each language-model job.
//!
//! Every builder is pure; the adapters send the messages and parse replies.

use crate::{
    llm::client::ChatMessage,
    ports::{ExtractionRequest, NarrativeFacts, NutritionRequest, PolishRequest, RoutingContext},
    types::{RiskLevel, RoutingDecision},
};

const DECOMPOSER_SYSTEM: &str = "You are a semantic message decomposer.

Break any user message into three categories:
1. QUESTIONS: anything the user is explicitly or implicitly asking.
2. INFORMATION: symptoms, facts, personal details, observations, statements.
3. OUT_OF_CONTEXT: jokes, filler, chit-chat, irrelevant content.

Rules:
- Work at the sentence or semantic-unit level.
- A message may produce zero, one, two or three categories.
- Reformulate each unit clearly and concisely.
- Do not answer, diagnose or advise.
- Output only the structure below, no commentary.

QUESTIONS:
- ...

INFORMATION:
- ...

OUT_OF_CONTEXT:
- ...";

pub fn decomposer(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(DECOMPOSER_SYSTEM),
        ChatMessage::user(text),
    ]
}

fn optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| "null".to_string(), |value| value.to_string())
}

pub fn extractor(req: &ExtractionRequest) -> Vec<ChatMessage> {
    let profile = &req.current_profile;
    let gender = profile
        .gender
        .map_or_else(|| "null".to_string(), |gender| format!("\"{}\"", gender.as_str()));
    let prompt = format!(
        "Extract medical information from the user message. Output only valid JSON.

Current values:
- age: {age}
- weight (kg): {weight}
- height (m): {height}
- waist (cm): {waist}
- gender: {gender}

Existing symptoms: {symptoms:?}

User message: \"{text}\"

Rules:
1. Extract only what the user explicitly states in this message; never estimate.
2. A greeting alone yields empty vars and no symptoms.
3. Keep numbers with the unit the user gave, e.g. \"180 cm\", \"250 lbs\", \"38 in\".
4. Body descriptors are not symptoms: \"stubborn waist\", \"big belly\" are not;
   \"constant fatigue\", \"blurry vision recently\" are.
5. Symptoms are short phrases of 3 to 6 words.

JSON format:
{{\"vars\": {{\"age\": ..., \"weight\": ..., \"height\": ..., \"waist\": ..., \"gender\": ...}}, \"symptoms\": [\"...\"]}}
Leave out any field the message does not mention.",
        age = optional_number(profile.age),
        weight = optional_number(profile.weight_kg),
        height = optional_number(profile.height_m),
        waist = optional_number(profile.waist_cm),
        gender = gender,
        symptoms = req.current_symptoms,
        text = req.raw_text,
    );
    vec![ChatMessage::user(prompt)]
}

pub fn narrator(facts: &NarrativeFacts) -> Vec<ChatMessage> {
    let index = facts
        .mets_ir
        .map_or_else(|| "not available".to_string(), |value| format!("{value:.1}"));
    let score = facts
        .symptom_score
        .map_or_else(|| "not available".to_string(), |value| format!("{value:.2}"));
    let prompt = format!(
        "You are a medical laboratory data interpreter.

Thresholds for METS-IR: Low < 35, Moderate 35 to 50, High > 50.

METS-IR value: {index}
Assessed risk tier: {tier}
Symptom score (0 to 1): {score}
Clinically relevant symptoms: {relevant:?}
Tier raised by symptom evidence: {raised}

Write a concise, professional explanation that states the tier, interprets insulin
sensitivity and cardiometabolic risk, recommends discussing results with a physician,
and notes that this is a screening aid, not a diagnosis. Do not give treatment advice
and do not change the tier.

Return JSON only: {{\"response\": \"text\"}}",
        tier = facts.risk_level,
        relevant = facts.relevant_symptoms,
        raised = facts.raised_by_symptoms,
    );
    vec![ChatMessage::user(prompt)]
}

pub fn router(ctx: &RoutingContext) -> Vec<ChatMessage> {
    let previous = ctx
        .previous_intent
        .map_or_else(|| "none".to_string(), |intent| intent.to_string());
    let prompt = format!(
        "You are a memory-aware conversation router for a health assistant.

Current situation:
- User input: \"{input}\"
- Decomposition: {decomposition}
- Current intent: {intent}
- Previous intent: {previous}
- Intent changed: {changed}

Conversation memory:
- Diagnosis completed: {completed}
- Has health profile: {has_profile}
- Previous interactions: {interactions}
- Diagnosis status: {status:?}

Data sufficiency:
- Diagnosis: {dsuff:?}
- Nutrition: {nsuff:?}

Context appropriateness: {appropriateness:?}

Routing options:
- \"{diagnosis}\": health assessment, symptom analysis, risk calculation
- \"{nutrition}\": dietary advice, meal suggestions, food questions
- \"{finalize}\": general questions, clarifications, guidance, out of scope

Return JSON only:
{{\"routing_decision\": \"...\", \"confidence\": 0.0, \"reasoning\": \"...\"}}",
        input = ctx.input,
        decomposition = ctx.decomposition,
        intent = ctx.intent,
        changed = ctx.intent_changed,
        completed = ctx.diagnosis_completed,
        has_profile = ctx.has_health_profile,
        interactions = ctx.previous_interactions,
        status = ctx.diagnosis_status,
        dsuff = ctx.diagnosis_sufficiency,
        nsuff = ctx.nutrition_sufficiency,
        appropriateness = ctx.appropriateness,
        diagnosis = RoutingDecision::Diagnosis.as_str(),
        nutrition = RoutingDecision::Nutrition.as_str(),
        finalize = RoutingDecision::Finalize.as_str(),
    );
    vec![ChatMessage::user(prompt)]
}

pub fn nutrition_classifier(text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Determine the user's intent.

Text: \"{text}\"

Respond with only one of:
- suggest_dish
- give_advice"
    ))]
}

fn metabolic_profile(risk_level: Option<RiskLevel>) -> String {
    match risk_level {
        Some(level) if level != RiskLevel::Unknown => {
            format!("insulin resistance, assessed risk {}", level.as_str().to_lowercase())
        }
        _ => "insulin resistance".to_string(),
    }
}

pub fn suggest_dish(req: &NutritionRequest) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "User metabolic profile: {profile}.
Request: {text}

Constraints:
- Low glycemic load
- Avoid refined carbs and sugar
- Net carbs under 30g
- Include protein and fiber
- 300 to 500 calories

Suggest one adapted dish. Return JSON only:
{{\"dish_name\": \"...\", \"ingredients\": [\"...\"], \"total_calories\": 0, \"net_carbs\": 0,
\"protein\": 0, \"fiber\": 0, \"reason\": \"...\"}}",
        profile = metabolic_profile(req.risk_level),
        text = req.text,
    ))]
}

pub fn give_advice(req: &NutritionRequest) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "User metabolic profile: {profile}.
The user mentions eating: {text}

Rules:
- Be honest about glycemic risk
- No shaming
- Provide mitigation strategies

Return JSON only:
{{\"advice\": \"...\", \"glycemic_risk\": \"low|moderate|high\", \"improvements\": [\"...\"],
\"calorie_estimate\": 0}}",
        profile = metabolic_profile(req.risk_level),
        text = req.text,
    ))]
}

pub fn polisher(req: &PolishRequest) -> Vec<ChatMessage> {
    let intent = serde_json::to_value(req.intent)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    let tone = serde_json::to_value(req.tone)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    vec![ChatMessage::user(format!(
        "You are a skilled support communicator.

Transform the internal text into a user-facing message.

INTENT: {intent}
TONE: {tone}

INTERNAL TEXT:
{source}

Rules:
- Do not mention internal notes or system details
- Do not add new medical facts
- Keep the message human, clear and empathetic
- explain: clarify calmly; summarize: short and focused;
  warn: clear, direct, respectful; guide: step by step but friendly
- Match the tone naturally

Return only the final message.",
        source = req.source_text,
    ))]
}

use std::sync::{Arc, Mutex};

use nutrisense::{
    ports::{
        DishAdvice, DishSuggestion, GlycemicRisk, NutritionMode, NutritionRequest, PolishRequest,
        RoutingAdvice,
    },
    session::{ConversationMemory, DiagnosisContext, QuestionType},
    testing::ScriptedCollaborators,
    types::{HealthProfile, Intent, RiskLevel, RoutingDecision},
};

use super::{complete_profile, decomposing_to, seeded_orchestrator};

fn echo_polisher(scripted: ScriptedCollaborators) -> ScriptedCollaborators {
    scripted.with_polish(|req: PolishRequest| async move {
        Ok(format!("polished:{}", req.source_text))
    })
}

fn diagnosable_memory() -> ConversationMemory {
    ConversationMemory {
        health_profile: complete_profile(),
        diagnosis_context: DiagnosisContext {
            symptoms: vec![
                "fatigue".to_string(),
                "thirst".to_string(),
                "frequent urination".to_string(),
            ],
            ..DiagnosisContext::default()
        },
        ..ConversationMemory::default()
    }
}

#[tokio::test]
async fn given_four_fields_and_dinner_question_then_nutrition_advice_is_polished() {
    let requests: Arc<Mutex<Vec<NutritionRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let scripted = echo_polisher(
        decomposing_to("QUESTIONS:\n- What should I eat for dinner?").with_give_advice(
            move |req: NutritionRequest| {
                if let Ok(mut requests) = recorded.lock() {
                    requests.push(req);
                }
                async {
                    Ok(DishAdvice {
                        advice: "Pick grilled fish with greens".to_string(),
                        glycemic_risk: GlycemicRisk::Low,
                        improvements: Vec::new(),
                        calorie_estimate: 480.0,
                    })
                }
            },
        ),
    );
    let memory = ConversationMemory {
        health_profile: HealthProfile {
            waist_cm: None,
            ..complete_profile()
        },
        ..ConversationMemory::default()
    };
    let orchestrator = seeded_orchestrator(scripted, "s1", memory).await;

    let turn = orchestrator
        .handle_turn("s1", "what should I eat for dinner tonight")
        .await
        .expect("turn should succeed");
    assert_eq!(turn.routing.routing_decision, RoutingDecision::Nutrition);
    assert_eq!(
        turn.nutrition_result.as_deref(),
        Some("ADVICE: Pick grilled fish with greens (glycemic risk: low, ~480 cal)")
    );
    assert_eq!(
        turn.final_response,
        "polished:DIAGNOSIS:\nN/A\n\nNUTRITION:\nADVICE: Pick grilled fish with greens (glycemic risk: low, ~480 cal)"
    );
    assert!(turn.subgraph_results.contains_key("nutrition"));

    let requests = requests.lock().expect("request log should lock");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].risk_level.is_none());
}

#[tokio::test]
async fn given_decomposition_with_suggestion_words_then_nutrition_mode_follows_user_text() {
    let requests: Arc<Mutex<Vec<NutritionRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let scripted = decomposing_to("QUESTIONS:\n- Any idea whether rice at dinner works?")
        .with_suggest_dish(|_| async {
            Ok(DishSuggestion {
                dish_name: "Cauliflower rice bowl".to_string(),
                ingredients: Vec::new(),
                total_calories: 400.0,
                net_carbs: 12.0,
                protein: 30.0,
                fiber: 8.0,
                reason: "fewer carbs".to_string(),
            })
        })
        .with_give_advice(move |req: NutritionRequest| {
            if let Ok(mut requests) = recorded.lock() {
                requests.push(req);
            }
            async {
                Ok(DishAdvice {
                    advice: "Keep the rice portion small".to_string(),
                    glycemic_risk: GlycemicRisk::Moderate,
                    improvements: Vec::new(),
                    calorie_estimate: 350.0,
                })
            }
        });
    let memory = ConversationMemory {
        health_profile: complete_profile(),
        ..ConversationMemory::default()
    };
    let orchestrator = seeded_orchestrator(scripted, "s1", memory).await;

    let turn = orchestrator
        .handle_turn("s1", "should I eat white rice at dinner")
        .await
        .expect("turn should succeed");
    assert_eq!(turn.routing.routing_decision, RoutingDecision::Nutrition);
    assert!(
        turn.nutrition_result
            .as_deref()
            .is_some_and(|text| text.starts_with("ADVICE: Keep the rice portion small")),
        "unexpected nutrition result: {:?}",
        turn.nutrition_result
    );

    let requests = requests.lock().expect("request log should lock");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "should I eat white rice at dinner");
}

#[tokio::test]
async fn given_complete_data_then_diagnosis_is_remembered_for_followups() {
    let scripted = echo_polisher(
        decomposing_to("")
            .with_extract(|_| async { Ok(Default::default()) })
            .with_regression(|_| async { Ok(55.0) })
            .with_similarity(|_| async { Ok(Vec::new()) }),
    );
    let orchestrator = seeded_orchestrator(scripted, "s1", diagnosable_memory()).await;

    let turn = orchestrator
        .handle_turn("s1", "what is my risk")
        .await
        .expect("diagnosis turn should succeed");
    assert_eq!(turn.routing.intent, Intent::Health);
    assert_eq!(turn.routing.routing_decision, RoutingDecision::Diagnosis);
    let diagnosis = turn.diagnosis_result.expect("diagnosis should be reported");
    assert!(diagnosis.starts_with("Risk Level: High"));
    assert!(turn.nutrition_result.is_none());
    assert!(turn.subgraph_results.contains_key("diagnosis"));

    let summary = orchestrator.summary("s1").await;
    assert!(summary.diagnosis_completed);
    assert_eq!(
        summary.last_diagnosis.map(|report| report.risk_level),
        Some(RiskLevel::High)
    );

    let followup = orchestrator
        .handle_turn("s1", "can you explain that")
        .await
        .expect("follow-up should succeed");
    assert_eq!(followup.routing.intent, Intent::Followup);
    assert_eq!(followup.routing.routing_decision, RoutingDecision::Finalize);
    assert!(
        followup
            .final_response
            .starts_with("polished:DIAGNOSIS:\nRisk Level: High"),
        "unexpected reply: {}",
        followup.final_response
    );
}

#[tokio::test]
async fn given_missing_fields_then_diagnosis_question_becomes_the_reply() {
    let scripted = decomposing_to("").with_extract(|_| async { Ok(Default::default()) });
    let memory = ConversationMemory {
        health_profile: HealthProfile {
            age: Some(40.0),
            weight_kg: Some(75.0),
            ..HealthProfile::default()
        },
        ..ConversationMemory::default()
    };
    let orchestrator = seeded_orchestrator(scripted, "s1", memory).await;

    let turn = orchestrator
        .handle_turn("s1", "what is my risk")
        .await
        .expect("turn should succeed");
    assert_eq!(turn.routing.routing_decision, RoutingDecision::Diagnosis);
    assert!(
        turn.final_response
            .starts_with("Please provide the following health details:")
    );
    assert_eq!(turn.diagnosis_question.as_deref(), Some(turn.final_response.as_str()));

    let memory = orchestrator.sessions().snapshot("s1").await;
    assert!(!memory.diagnosis_completed);
    assert_eq!(
        memory
            .diagnosis_context
            .question_ledger
            .times_asked(QuestionType::Demographics),
        1
    );
}

#[tokio::test]
async fn given_low_confidence_diagnosis_route_then_nutrition_follows_the_report() {
    let nutrition_risk: Arc<Mutex<Option<RiskLevel>>> = Arc::new(Mutex::new(None));
    let recorded = Arc::clone(&nutrition_risk);
    let scripted = decomposing_to("")
        .with_route(|_| async {
            Ok(RoutingAdvice {
                decision: RoutingDecision::Diagnosis,
                confidence: 0.5,
                reasoning: "wants a risk check".to_string(),
            })
        })
        .with_extract(|_| async { Ok(Default::default()) })
        .with_regression(|_| async { Ok(55.0) })
        .with_similarity(|_| async { Ok(Vec::new()) })
        .with_classify_nutrition(|_| async { Ok(NutritionMode::SuggestDish) })
        .with_suggest_dish(move |req: NutritionRequest| {
            if let Ok(mut slot) = recorded.lock() {
                *slot = req.risk_level;
            }
            async {
                Ok(DishSuggestion {
                    dish_name: "Chickpea stew".to_string(),
                    ingredients: vec!["chickpeas".to_string()],
                    total_calories: 510.0,
                    net_carbs: 28.0,
                    protein: 21.0,
                    fiber: 14.0,
                    reason: "slow carbs".to_string(),
                })
            }
        });
    let orchestrator = seeded_orchestrator(scripted, "s1", diagnosable_memory()).await;

    let turn = orchestrator
        .handle_turn("s1", "does my computer job raise my blood sugar")
        .await
        .expect("turn should succeed");
    assert_eq!(turn.routing.intent, Intent::OutOfContext);
    assert_eq!(turn.routing.confidence, 0.5);
    assert_eq!(turn.routing.reasoning, "wants a risk check");
    assert!(turn.diagnosis_result.is_some());
    assert_eq!(
        turn.nutrition_result.as_deref(),
        Some("SUGGESTION: Chickpea stew (510 cal, 28g net carbs) - slow carbs")
    );
    assert!(turn.final_response.starts_with("Risk Level: High"));
    assert!(
        turn.final_response
            .ends_with("\n\nSUGGESTION: Chickpea stew (510 cal, 28g net carbs) - slow carbs")
    );
    assert_eq!(
        *nutrition_risk.lock().expect("risk slot should lock"),
        Some(RiskLevel::High)
    );
}

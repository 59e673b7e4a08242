use nutrisense::{
    ports::ExtractionRequest,
    session::DiagnosisContext,
    testing::ScriptedCollaborators,
    types::HealthProfile,
};
use serde_json::json;

use super::{extracted, machine};

#[tokio::test]
async fn given_height_already_in_meters_then_it_is_kept_across_turns() {
    let machine = machine(ScriptedCollaborators::new().with_extract(|_| async {
        Ok(extracted(&[("height", json!(1.75))], &[]))
    }));

    let first = machine
        .run("I'm 1.75", &HealthProfile::default(), &DiagnosisContext::default())
        .await
        .expect("run should not fail");
    let profile = first.profile();
    assert_eq!(profile.height_m, Some(1.75));

    let context = first.state.into_context();
    let second = machine
        .run("still 1.75", &profile, &context)
        .await
        .expect("run should not fail");
    assert_eq!(second.profile().height_m, Some(1.75));
}

#[tokio::test]
async fn given_stored_waist_below_inch_threshold_when_echoed_back_then_it_stays_in_centimeters() {
    let baseline = HealthProfile {
        waist_cm: Some(70.0),
        ..HealthProfile::default()
    };
    let machine = machine(ScriptedCollaborators::new().with_extract(|_| async {
        Ok(extracted(&[("waist", json!(70.0))], &[]))
    }));

    let run = machine
        .run("nothing new about my waist", &baseline, &DiagnosisContext::default())
        .await
        .expect("run should not fail");
    assert_eq!(run.profile().waist_cm, Some(70.0));
}

#[tokio::test]
async fn given_impossible_waist_then_previous_value_is_kept() {
    let baseline = HealthProfile {
        waist_cm: Some(92.0),
        ..HealthProfile::default()
    };
    let machine = machine(ScriptedCollaborators::new().with_extract(|_| async {
        Ok(extracted(
            &[("waist_cm", json!(900)), ("age", json!(430))],
            &[],
        ))
    }));

    let run = machine
        .run("waist 900cm, age 430", &baseline, &DiagnosisContext::default())
        .await
        .expect("run should not fail");
    let profile = run.profile();
    assert_eq!(profile.waist_cm, Some(92.0));
    assert!(profile.age.is_none());
}

#[tokio::test]
async fn given_known_profile_then_extractor_sees_it_with_current_symptoms() {
    let machine = machine(ScriptedCollaborators::new().with_extract(
        |req: ExtractionRequest| async move {
            assert_eq!(req.current_profile.age, Some(61.0));
            assert_eq!(req.current_symptoms, vec!["fatigue".to_string()]);
            Ok(extracted(&[("weight_kg", json!("88"))], &["Fatigue", "thirst"]))
        },
    ));
    let profile = HealthProfile {
        age: Some(61.0),
        ..HealthProfile::default()
    };
    let context = DiagnosisContext {
        symptoms: vec!["fatigue".to_string()],
        ..DiagnosisContext::default()
    };

    let run = machine
        .run("I weigh 88kg and I'm thirsty", &profile, &context)
        .await
        .expect("run should not fail");
    assert_eq!(run.profile().weight_kg, Some(88.0));
    assert_eq!(
        run.state.symptoms,
        vec!["fatigue".to_string(), "thirst".to_string()]
    );
}

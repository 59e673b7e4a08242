mod gating_flow;
mod normalization;

use std::{collections::BTreeMap, time::Duration};

use nutrisense::{
    diagnosis::{DiagnosisMachine, DiagnosisSettings},
    ports::ExtractedInfo,
    scoring::ScoringSettings,
    testing::ScriptedCollaborators,
};
use serde_json::Value;

pub fn settings() -> DiagnosisSettings {
    DiagnosisSettings {
        collaborator_timeout: Duration::from_millis(500),
        scoring: ScoringSettings {
            timeout: Duration::from_millis(500),
            ..ScoringSettings::default()
        },
        ..DiagnosisSettings::default()
    }
}

pub fn machine(scripted: ScriptedCollaborators) -> DiagnosisMachine {
    DiagnosisMachine::new(&scripted.into_collaborators(), settings())
}

pub fn extracted(vars: &[(&str, Value)], symptoms: &[&str]) -> ExtractedInfo {
    ExtractedInfo {
        vars: vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect::<BTreeMap<_, _>>(),
        symptoms: symptoms.iter().map(|symptom| symptom.to_string()).collect(),
    }
}

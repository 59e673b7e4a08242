use std::fmt;

use serde::{Deserialize, Serialize};

pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthField {
    Age,
    Weight,
    Height,
    Waist,
    Gender,
}

impl HealthField {
    pub const REQUIRED: [HealthField; 5] = [
        HealthField::Age,
        HealthField::Weight,
        HealthField::Height,
        HealthField::Waist,
        HealthField::Gender,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Waist => "waist",
            Self::Gender => "gender",
        }
    }
}

impl fmt::Display for HealthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "m" | "male" | "man" | "boy" | "homme" | "h" => Some(Self::Male),
            "f" | "female" | "woman" | "girl" | "femme" | "w" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health facts collected over a session, always in canonical units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub waist_cm: Option<f64>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl HealthProfile {
    pub fn has(&self, field: HealthField) -> bool {
        match field {
            HealthField::Age => self.age.is_some(),
            HealthField::Weight => self.weight_kg.is_some(),
            HealthField::Height => self.height_m.is_some(),
            HealthField::Waist => self.waist_cm.is_some(),
            HealthField::Gender => self.gender.is_some(),
        }
    }

    pub fn present_count(&self) -> usize {
        HealthField::REQUIRED
            .iter()
            .filter(|field| self.has(**field))
            .count()
    }

    pub fn missing_fields(&self) -> Vec<HealthField> {
        HealthField::REQUIRED
            .iter()
            .copied()
            .filter(|field| !self.has(*field))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.present_count() == HealthField::REQUIRED.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    pub fn bmi(&self) -> Option<f64> {
        let weight = self.weight_kg?;
        let height = self.height_m?;
        if height <= 0.0 {
            return None;
        }
        Some(weight / (height * height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Health,
    Nutrition,
    Followup,
    General,
    OutOfContext,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Nutrition => "nutrition",
            Self::Followup => "followup",
            Self::General => "general",
            Self::OutOfContext => "out_of_context",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStatus {
    None,
    Partial,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sufficiency {
    Insufficient,
    Partial,
    Sufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextAppropriateness {
    Appropriate,
    OutOfContext,
    Unclear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    Diagnosis,
    Nutrition,
    Finalize,
}

impl RoutingDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Nutrition => "nutrition",
            Self::Finalize => "finalize",
        }
    }

    /// Accepts the decision labels a routing collaborator may answer with.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "diagnosis" => Some(Self::Diagnosis),
            "nutrition" => Some(Self::Nutrition),
            "finalize" | "polish" => Some(Self::Finalize),
            _ => None,
        }
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Unknown,
}

pub const METS_IR_LOW_THRESHOLD: f64 = 35.0;
pub const METS_IR_HIGH_THRESHOLD: f64 = 50.0;

impl RiskLevel {
    pub fn from_index(mets_ir: f64) -> Self {
        if mets_ir < METS_IR_LOW_THRESHOLD {
            Self::Low
        } else if mets_ir <= METS_IR_HIGH_THRESHOLD {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn raised(self) -> Self {
        match self {
            Self::Low => Self::Moderate,
            Self::Moderate | Self::High => Self::High,
            Self::Unknown => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantFactor {
    MetsIr,
    SymptomScore,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub risk_level: RiskLevel,
    pub dominant_factor: DominantFactor,
    pub interpretation: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub mets_ir: Option<f64>,
    #[serde(default)]
    pub symptom_score: Option<f64>,
}

impl DiagnosisReport {
    pub fn render(&self) -> String {
        let mut text = format!(
            "Risk Level: {}\nInterpretation: {}",
            self.risk_level, self.interpretation
        );
        if let Some(note) = self.note.as_deref().filter(|note| !note.trim().is_empty()) {
            text.push_str("\nNote: ");
            text.push_str(note);
        }
        text
    }
}

use crate::types::{DominantFactor, RiskLevel};

pub const SYMPTOM_RAISE_MIN_SCORE: f64 = 0.5;
pub const SYMPTOM_RAISE_MIN_RELEVANT: usize = 3;
pub const MODEL_RANGE_LOW: f64 = 20.0;
pub const MODEL_RANGE_HIGH: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FusionVerdict {
    pub risk_level: RiskLevel,
    pub dominant_factor: DominantFactor,
    pub raised_by_symptoms: bool,
    pub note: Option<String>,
}

/// Combines the metabolic index and the symptom score into one risk tier.
///
/// The index sets the tier; symptom evidence can lift it by one level and
/// never lower it.
pub fn fuse(
    mets_ir: Option<f64>,
    symptom_score: Option<f64>,
    relevant_symptoms: usize,
) -> FusionVerdict {
    let Some(index) = mets_ir.filter(|value| value.is_finite()) else {
        return FusionVerdict {
            risk_level: RiskLevel::Unknown,
            dominant_factor: if symptom_score.is_some() {
                DominantFactor::SymptomScore
            } else {
                DominantFactor::MetsIr
            },
            raised_by_symptoms: false,
            note: None,
        };
    };

    let base = RiskLevel::from_index(index);
    let symptoms_support_raise = symptom_score.is_some_and(|score| score >= SYMPTOM_RAISE_MIN_SCORE)
        && relevant_symptoms >= SYMPTOM_RAISE_MIN_RELEVANT;
    let risk_level = if symptoms_support_raise {
        base.raised()
    } else {
        base
    };
    let raised_by_symptoms = risk_level != base;

    let note = (!(MODEL_RANGE_LOW..=MODEL_RANGE_HIGH).contains(&index)).then(|| {
        format!(
            "METS-IR value {index:.1} lies outside the range the model was fitted on; treat it as model extrapolation."
        )
    });

    FusionVerdict {
        risk_level,
        dominant_factor: if raised_by_symptoms {
            DominantFactor::Balanced
        } else {
            DominantFactor::MetsIr
        },
        raised_by_symptoms,
        note,
    }
}

/// Interpretation used when no narrative could be generated.
pub fn fallback_interpretation(verdict: &FusionVerdict, mets_ir: Option<f64>) -> String {
    match mets_ir.filter(|_| verdict.risk_level != RiskLevel::Unknown) {
        Some(index) => {
            let mut text = format!(
                "Based on METS-IR score of {index:.1}, insulin resistance risk is {}.",
                verdict.risk_level.as_str().to_lowercase()
            );
            if verdict.raised_by_symptoms {
                text.push_str(" Reported symptoms raised the assessment by one level.");
            }
            text
        }
        None => "Unable to calculate risk due to missing data.".to_string(),
    }
}

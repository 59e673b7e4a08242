use crate::{
    session::{DiagnosisContext, QuestionLedger},
    types::{DiagnosisReport, Gender, HealthField, HealthProfile},
    units::{self, Reading},
};

/// Working copy of the profile fields during one diagnosis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingVars {
    pub age: Option<f64>,
    pub gender: Option<Gender>,
    pub weight: Option<Reading>,
    pub height: Option<Reading>,
    pub waist: Option<Reading>,
}

impl WorkingVars {
    pub fn from_profile(profile: &HealthProfile) -> Self {
        Self {
            age: profile.age,
            gender: profile.gender,
            weight: profile
                .weight_kg
                .map(|value| Reading::canonical(HealthField::Weight, value)),
            height: profile
                .height_m
                .map(|value| Reading::canonical(HealthField::Height, value)),
            waist: profile
                .waist_cm
                .map(|value| Reading::canonical(HealthField::Waist, value)),
        }
    }

    /// Profile view; readings that are not yet canonical are left out.
    pub fn to_profile(&self) -> HealthProfile {
        HealthProfile {
            age: self.age,
            weight_kg: self.canonical_value(HealthField::Weight),
            height_m: self.canonical_value(HealthField::Height),
            waist_cm: self.canonical_value(HealthField::Waist),
            gender: self.gender,
        }
    }

    fn canonical_value(&self, field: HealthField) -> Option<f64> {
        self.reading(field)
            .filter(|reading| reading.is_canonical_for(field))
            .map(|reading| reading.value)
    }

    pub fn reading(&self, field: HealthField) -> Option<Reading> {
        match field {
            HealthField::Weight => self.weight,
            HealthField::Height => self.height,
            HealthField::Waist => self.waist,
            HealthField::Age | HealthField::Gender => None,
        }
    }

    pub fn set_reading(&mut self, field: HealthField, reading: Option<Reading>) {
        match field {
            HealthField::Weight => self.weight = reading,
            HealthField::Height => self.height = reading,
            HealthField::Waist => self.waist = reading,
            HealthField::Age | HealthField::Gender => {}
        }
    }

    pub fn has(&self, field: HealthField) -> bool {
        match field {
            HealthField::Age => self.age.is_some(),
            HealthField::Gender => self.gender.is_some(),
            _ => self.reading(field).is_some(),
        }
    }

    pub fn missing(&self) -> Vec<HealthField> {
        HealthField::REQUIRED
            .iter()
            .copied()
            .filter(|field| !self.has(*field))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisState {
    /// Profile as it stood before this run; restores fields whose new value is rejected.
    pub baseline: HealthProfile,
    pub vars: WorkingVars,
    pub symptoms: Vec<String>,
    pub mets_ir: Option<f64>,
    pub index_attempted: bool,
    pub symptom_score: Option<f64>,
    pub relevant_symptoms: Vec<String>,
    pub ledger: QuestionLedger,
    pub ready: bool,
    pub report: Option<DiagnosisReport>,
}

impl DiagnosisState {
    pub fn seeded(profile: &HealthProfile, context: &DiagnosisContext) -> Self {
        Self {
            baseline: profile.clone(),
            vars: WorkingVars::from_profile(profile),
            symptoms: context.symptoms.clone(),
            mets_ir: None,
            index_attempted: false,
            symptom_score: None,
            relevant_symptoms: Vec::new(),
            ledger: context.question_ledger.clone(),
            ready: false,
            report: None,
        }
    }

    /// Brings every reading to its canonical unit and rejects impossible values.
    pub fn normalize(&mut self) {
        if let Some(age) = self.vars.age {
            if !units::is_plausible(HealthField::Age, age) {
                reject(HealthField::Age, age);
                self.vars.age = self.baseline.age;
            }
        }

        for field in [HealthField::Weight, HealthField::Height, HealthField::Waist] {
            let Some(reading) = self.vars.reading(field) else {
                continue;
            };
            let canonical = units::normalize_reading(field, reading);
            if units::is_plausible(field, canonical.value) {
                self.vars.set_reading(field, Some(canonical));
            } else {
                reject(field, canonical.value);
                let previous = WorkingVars::from_profile(&self.baseline).reading(field);
                self.vars.set_reading(field, previous);
            }
        }
    }

    pub fn into_context(self) -> DiagnosisContext {
        DiagnosisContext {
            symptoms: self.symptoms,
            question_ledger: self.ledger,
        }
    }
}

fn reject(field: HealthField, value: f64) {
    tracing::warn!(
        target: "diagnosis",
        field = field.as_str(),
        value = value,
        "implausible_value_dropped"
    );
}

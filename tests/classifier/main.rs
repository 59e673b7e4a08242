mod sufficiency;

use nutrisense::{
    session::ConversationMemory,
    types::{Gender, HealthProfile},
};

pub fn memory_with_profile(profile: HealthProfile) -> ConversationMemory {
    ConversationMemory {
        health_profile: profile,
        ..ConversationMemory::default()
    }
}

pub fn four_field_profile() -> HealthProfile {
    HealthProfile {
        age: Some(45.0),
        weight_kg: Some(82.0),
        height_m: Some(1.75),
        waist_cm: None,
        gender: Some(Gender::Male),
    }
}

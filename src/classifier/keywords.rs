use std::sync::LazyLock;

use regex::Regex;

/// Inflections accepted after a keyword stem ("carb" matches "carbs", not "car").
const SUFFIXES: &str = "s|es|ing|ed|d|y|ly|al|ary|er|ers";

/// Case-insensitive whole-word keyword matcher.
pub struct KeywordSet {
    pattern: Option<Regex>,
}

impl KeywordSet {
    pub fn new(keywords: &[&str]) -> Self {
        let alternatives = keywords
            .iter()
            .map(|keyword| regex::escape(keyword))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{alternatives})(?:{SUFFIXES})?\b")).ok();
        Self { pattern }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }
}

pub static INTENT_OUT_OF_CONTEXT: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "weather",
        "sports",
        "politics",
        "entertainment",
        "technology",
        "travel",
        "shopping",
        "games",
        "movies",
        "music",
        "news",
        "stock",
        "investment",
        "programming",
        "software",
        "computer",
        "phone",
        "car",
        "fashion",
    ])
});

pub static INTENT_HEALTH: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "symptom",
        "tired",
        "fatigue",
        "thirst",
        "urination",
        "vision",
        "weight",
        "waist",
        "health",
        "risk",
        "diabetes",
        "insulin",
        "blood",
        "glucose",
        "medical",
        "doctor",
        "diagnosis",
        "pain",
        "ache",
        "feel",
        "body",
        "physical",
    ])
});

pub static INTENT_NUTRITION: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "food",
        "eat",
        "meal",
        "diet",
        "nutrition",
        "recipe",
        "cook",
        "breakfast",
        "lunch",
        "dinner",
        "snack",
        "ingredient",
        "calorie",
        "carb",
        "protein",
        "sugar",
        "fat",
        "fiber",
    ])
});

pub static INTENT_FOLLOWUP: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "what does",
        "explain",
        "mean",
        "clarify",
        "more about",
        "tell me",
        "understand",
        "how",
        "why",
        "what is",
    ])
});

pub static SCOPE_OUT_OF_CONTEXT: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "weather",
        "sports",
        "politics",
        "entertainment",
        "technology",
        "travel",
        "shopping",
        "games",
        "movies",
        "music",
        "news",
        "stock",
        "investment",
    ])
});

pub static SCOPE_IN_CONTEXT: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        // health
        "health",
        "medical",
        "symptom",
        "tired",
        "fatigue",
        "thirst",
        "urination",
        "vision",
        "weight",
        "waist",
        "diabetes",
        "insulin",
        "blood",
        "glucose",
        "risk",
        "diagnosis",
        "doctor",
        "medication",
        "treatment",
        "pain",
        "ache",
        // nutrition
        "food",
        "eat",
        "meal",
        "diet",
        "nutrition",
        "recipe",
        "cook",
        "breakfast",
        "lunch",
        "dinner",
        "snack",
        "ingredient",
        "calorie",
        "carb",
        "protein",
        "sugar",
        "fat",
        "fiber",
        "vitamin",
        "supplement",
        // education
        "what is",
        "explain",
        "how does",
        "why",
        "meaning",
        "definition",
        "understand",
        "learn",
        "information",
        "help",
        "advice",
    ])
});

pub mod formula;
pub mod risk;

pub use formula::{MatchStats, SymptomMatch, score_matches, sigmoid};
pub use risk::{RiskScorer, ScoringSettings, SymptomAssessment};

pub mod extract;
pub mod fusion;
pub mod gating;
pub mod machine;
pub mod state;

pub use fusion::{FusionVerdict, fuse};
pub use gating::{GateDecision, GatingPolicy, gate};
pub use machine::{
    DiagnosisMachine, DiagnosisOutcome, DiagnosisRun, DiagnosisSettings, SYMPTOM_QUESTION,
};
pub use state::{DiagnosisState, WorkingVars};

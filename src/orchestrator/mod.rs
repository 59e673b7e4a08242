pub mod engine;
pub mod finalize;
pub mod state;

pub use engine::{APOLOGY, Orchestrator};
pub use state::{MemoryRouting, TurnState};

pub mod memory;
pub mod store;

pub use memory::{
    ConversationMemory, DiagnosisContext, InteractionRecord, MemoryLimits, QuestionLedger,
    QuestionLedgerEntry, QuestionType, SessionSummary,
};
pub use store::{SessionLease, SessionStore};

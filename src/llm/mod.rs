//! OpenAI-compatible chat client and the language-model collaborators built on it.

pub mod adapters;
pub mod client;
pub mod credentials;
pub mod error;
pub mod prompts;
pub mod types;

pub use adapters::LlmCollaborator;
pub use client::{ChatClient, ChatMessage, OutputMode};
pub use error::{LlmError, LlmErrorKind};
pub use types::{LlmConfig, LlmRole};

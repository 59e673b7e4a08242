use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    InvalidRequest,
    CollaboratorUnconfigured,
    InvariantViolation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

pub fn invalid_request(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineErrorKind::InvalidRequest, message)
}

pub fn collaborator_unconfigured(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineErrorKind::CollaboratorUnconfigured, message)
}

pub fn invariant_violation(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineErrorKind::InvariantViolation, message)
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::llm::types::BackendId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmErrorKind {
    InvalidRequest,
    Authentication,
    Authorization,
    RateLimited,
    Timeout,
    BackendTransient,
    BackendPermanent,
    ProtocolViolation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    pub retryable: bool,
    pub backend_id: Option<BackendId>,
    pub http_status: Option<u16>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: matches!(
                kind,
                LlmErrorKind::RateLimited | LlmErrorKind::Timeout | LlmErrorKind::BackendTransient
            ),
            backend_id: None,
            http_status: None,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_backend_id(mut self, backend_id: impl Into<String>) -> Self {
        self.backend_id = Some(backend_id.into());
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.backend_id, self.http_status) {
            (Some(backend_id), Some(status)) => {
                write!(f, "{} (backend={}, status={})", self.message, backend_id, status)
            }
            (Some(backend_id), None) => write!(f, "{} (backend={})", self.message, backend_id),
            (None, Some(status)) => write!(f, "{} (status={})", self.message, status),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for LlmError {}

pub fn invalid_request(message: impl Into<String>) -> LlmError {
    LlmError::new(LlmErrorKind::InvalidRequest, message).with_retryable(false)
}

pub fn protocol_violation(message: impl Into<String>) -> LlmError {
    LlmError::new(LlmErrorKind::ProtocolViolation, message).with_retryable(false)
}

pub fn map_http_error(status: u16, backend_id: &str, body: &str) -> LlmError {
    let normalized_body = body.chars().take(240).collect::<String>();

    let err = if status == 401 {
        LlmError::new(LlmErrorKind::Authentication, "authentication failed").with_retryable(false)
    } else if status == 403 {
        LlmError::new(LlmErrorKind::Authorization, "authorization failed").with_retryable(false)
    } else if status == 408 || status == 429 {
        LlmError::new(
            LlmErrorKind::RateLimited,
            format!("backend returned status {status}"),
        )
    } else if (400..500).contains(&status) {
        LlmError::new(
            LlmErrorKind::InvalidRequest,
            format!("backend rejected request: {normalized_body}"),
        )
        .with_retryable(false)
    } else if status >= 500 {
        LlmError::new(
            LlmErrorKind::BackendTransient,
            format!("backend failure: {normalized_body}"),
        )
    } else {
        LlmError::new(
            LlmErrorKind::BackendPermanent,
            format!("unexpected status {status}: {normalized_body}"),
        )
        .with_retryable(false)
    };

    err.with_backend_id(backend_id).with_http_status(status)
}

use std::env;

use async_trait::async_trait;

use crate::llm::{
    error::{LlmError, LlmErrorKind, invalid_request},
    types::{BackendProfile, CredentialRef, ResolvedCredential},
};

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(
        &self,
        reference: &CredentialRef,
        backend: &BackendProfile,
    ) -> Result<ResolvedCredential, LlmError>;
}

/// Reads bearer tokens from the process environment or the config itself.
#[derive(Default)]
pub struct EnvCredentialProvider;

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(
        &self,
        reference: &CredentialRef,
        backend: &BackendProfile,
    ) -> Result<ResolvedCredential, LlmError> {
        match reference {
            CredentialRef::Env { var } => {
                let token = env::var(var).map_err(|_| {
                    LlmError::new(
                        LlmErrorKind::Authentication,
                        format!(
                            "missing credential environment variable {} for backend {}",
                            var, backend.id
                        ),
                    )
                    .with_retryable(false)
                    .with_backend_id(backend.id.clone())
                })?;
                Ok(ResolvedCredential::bearer(&token))
            }
            CredentialRef::InlineToken { token } => {
                if token.trim().is_empty() {
                    return Err(invalid_request("inline credential token cannot be empty"));
                }
                Ok(ResolvedCredential::bearer(token))
            }
            CredentialRef::None => Ok(ResolvedCredential::none()),
        }
    }
}

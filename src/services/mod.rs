//! HTTP adapters for the similarity lookup and the regression model.

pub mod regression;
pub mod similarity;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ports::CollaboratorError;

pub use regression::HttpRegression;
pub use similarity::HttpSimilarity;

fn default_service_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub endpoint: String,
    #[serde(default = "default_service_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServiceEndpoint {
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServicesConfig {
    #[serde(default)]
    pub similarity: Option<ServiceEndpoint>,
    #[serde(default)]
    pub regression: Option<ServiceEndpoint>,
}

/// POSTs `body` as JSON and decodes a JSON reply, mapping transport
/// failures onto [`CollaboratorError`].
async fn post_json<B, R>(
    http: &reqwest::Client,
    service: &ServiceEndpoint,
    collaborator: &'static str,
    path: &str,
    body: &B,
) -> Result<R, CollaboratorError>
where
    B: Serialize + ?Sized,
    R: for<'de> Deserialize<'de>,
{
    let response = http
        .post(service.url(path))
        .timeout(service.timeout())
        .json(body)
        .send()
        .await
        .map_err(|err| {
            if err.is_timeout() {
                CollaboratorError::Timeout {
                    collaborator: collaborator.to_string(),
                    timeout_ms: service.request_timeout_ms,
                }
            } else {
                CollaboratorError::unavailable(collaborator, err.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body = body.chars().take(240).collect::<String>();
        tracing::warn!(
            target: "services",
            collaborator = collaborator,
            status = status.as_u16(),
            "service_request_rejected"
        );
        return Err(CollaboratorError::unavailable(
            collaborator,
            format!("status {}: {body}", status.as_u16()),
        ));
    }

    response
        .json::<R>()
        .await
        .map_err(|err| CollaboratorError::malformed(collaborator, err.to_string()))
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    ports::{CollaboratorError, ConceptMatch, SimilarityPort},
    services::{ServiceEndpoint, post_json},
};

const COLLABORATOR: &str = "similarity";

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    text: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct QueryReply {
    #[serde(default)]
    matches: Vec<ConceptMatch>,
}

/// Nearest-concept lookup over `POST {endpoint}/query`.
pub struct HttpSimilarity {
    http: reqwest::Client,
    service: ServiceEndpoint,
}

impl HttpSimilarity {
    pub fn new(http: reqwest::Client, service: ServiceEndpoint) -> Self {
        Self { http, service }
    }
}

#[async_trait]
impl SimilarityPort for HttpSimilarity {
    async fn query(&self, phrase: &str, k: usize) -> Result<Vec<ConceptMatch>, CollaboratorError> {
        let reply: QueryReply = post_json(
            &self.http,
            &self.service,
            COLLABORATOR,
            "query",
            &QueryBody { text: phrase, k },
        )
        .await?;
        tracing::debug!(
            target: "services",
            matches = reply.matches.len(),
            "similarity_queried"
        );
        Ok(reply.matches)
    }
}

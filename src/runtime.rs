use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{
    config::Config,
    llm::{ChatClient, LlmCollaborator},
    noop::{UnconfiguredRegression, UnconfiguredSimilarity},
    orchestrator::Orchestrator,
    ports::{Collaborators, RegressionPort, SimilarityPort},
    services::{HttpRegression, HttpSimilarity},
};

/// Wires every collaborator named in `config`; absent sections stay unconfigured.
pub fn build_collaborators(config: &Config) -> Result<Collaborators> {
    let mut collaborators = match &config.llm {
        Some(llm) => {
            let client = ChatClient::new(llm.clone())
                .map_err(|err| anyhow::anyhow!("failed to build llm client: {err}"))?;
            Collaborators::language_model_only(Arc::new(LlmCollaborator::new(Arc::new(client))))
        }
        None => Collaborators::unconfigured(),
    };

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build service http client")?;
    collaborators.similarity = match &config.services.similarity {
        Some(service) => Arc::new(HttpSimilarity::new(http.clone(), service.clone()))
            as Arc<dyn SimilarityPort>,
        None => Arc::new(UnconfiguredSimilarity),
    };
    collaborators.regression = match &config.services.regression {
        Some(service) => {
            Arc::new(HttpRegression::new(http, service.clone())) as Arc<dyn RegressionPort>
        }
        None => Arc::new(UnconfiguredRegression),
    };

    let report = collaborators.setup_report();
    tracing::info!(
        target: "orchestrator",
        llm_configured = report.llm_configured,
        similarity_configured = report.similarity_configured,
        regression_configured = report.regression_configured,
        "collaborators_built"
    );
    Ok(collaborators)
}

pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    Ok(Orchestrator::new(
        build_collaborators(config)?,
        config.engine.clone(),
    ))
}

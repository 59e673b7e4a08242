use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    ports::{CollaboratorError, MetabolicFeatures, RegressionPort},
    services::{ServiceEndpoint, post_json},
    types::Gender,
};

const COLLABORATOR: &str = "regression";

#[derive(Debug, Serialize, PartialEq)]
struct PredictBody {
    age: f64,
    /// 1 for male, 0 for female.
    gender: u8,
    bmi: f64,
    waist_cm: f64,
}

impl From<MetabolicFeatures> for PredictBody {
    fn from(features: MetabolicFeatures) -> Self {
        Self {
            age: features.age,
            gender: match features.gender {
                Gender::Male => 1,
                Gender::Female => 0,
            },
            bmi: features.bmi,
            waist_cm: features.waist_cm,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictReply {
    mets_ir: f64,
}

/// Metabolic index prediction over `POST {endpoint}/predict`.
pub struct HttpRegression {
    http: reqwest::Client,
    service: ServiceEndpoint,
}

impl HttpRegression {
    pub fn new(http: reqwest::Client, service: ServiceEndpoint) -> Self {
        Self { http, service }
    }
}

#[async_trait]
impl RegressionPort for HttpRegression {
    async fn predict(&self, features: MetabolicFeatures) -> Result<f64, CollaboratorError> {
        let reply: PredictReply = post_json(
            &self.http,
            &self.service,
            COLLABORATOR,
            "predict",
            &PredictBody::from(features),
        )
        .await?;
        Ok(reply.mets_ir)
    }
}

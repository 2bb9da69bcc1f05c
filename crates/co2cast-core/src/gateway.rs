//! Model Gateway - the only path from a submitted vector to the model.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{LoadError, PredictionError, SubmitError};
use crate::feature::{FeatureFrame, FeatureSchema, FeatureVector};
use crate::predictor::{check_columns, ModelHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub key: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importances: Option<Vec<FeatureImportance>>,
}

pub struct ModelGateway {
    model: ModelHandle,
    schema: FeatureSchema,
}

impl ModelGateway {
    /// Fails if the model declares columns that differ from `schema`.
    pub fn new(model: ModelHandle, schema: FeatureSchema) -> Result<Self, PredictionError> {
        if let Some(expected) = model.expected_columns() {
            check_columns(expected, &schema.column_names())?;
        }
        Ok(Self { model, schema })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, PredictionError> {
        let frame = FeatureFrame::from_vector(vector);
        check_columns(&self.schema.column_names(), frame.columns())?;

        let value = self.model.predict(&frame)?;
        if !value.is_finite() {
            return Err(PredictionError::NonFinite(value));
        }

        let importances = match self.model.feature_importances() {
            Some(weights) if weights.len() != self.schema.len() => {
                return Err(PredictionError::ImportanceShape {
                    expected: self.schema.len(),
                    actual: weights.len(),
                });
            }
            Some(weights) => Some(
                self.schema
                    .keys()
                    .zip(weights)
                    .map(|(key, weight)| FeatureImportance {
                        key: key.to_string(),
                        weight: *weight,
                    })
                    .collect(),
            ),
            None => None,
        };

        debug!(value, "prediction complete");
        Ok(PredictionResult { value, importances })
    }
}

/// Outcome of the one load attempt made per process.
pub enum GatewayStatus {
    Ready(ModelGateway),
    Unavailable(LoadError),
}

impl GatewayStatus {
    pub fn from_load(loaded: Result<ModelHandle, LoadError>, schema: FeatureSchema) -> Self {
        let model = match loaded {
            Ok(model) => model,
            Err(e) => {
                warn!("Model unavailable: {}", e);
                return GatewayStatus::Unavailable(e);
            }
        };

        match ModelGateway::new(model, schema) {
            Ok(gateway) => GatewayStatus::Ready(gateway),
            Err(e) => {
                warn!("Model rejected by feature schema: {}", e);
                GatewayStatus::Unavailable(LoadError::Schema(e.to_string()))
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, GatewayStatus::Ready(_))
    }

    pub fn gateway(&self) -> Result<&ModelGateway, SubmitError> {
        match self {
            GatewayStatus::Ready(gateway) => Ok(gateway),
            GatewayStatus::Unavailable(e) => Err(SubmitError::GatewayUnavailable(e.clone())),
        }
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match self {
            GatewayStatus::Ready(_) => None,
            GatewayStatus::Unavailable(e) => Some(e),
        }
    }
}

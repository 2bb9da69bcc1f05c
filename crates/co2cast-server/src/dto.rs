use std::collections::BTreeMap;

use co2cast_core::{FeatureImportance, FeatureSpec, FeatureVector, Variant};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// === Feature listing ===

#[derive(Debug, Serialize)]
pub struct FeatureField {
    pub key: &'static str,
    pub label: String,
    pub description: &'static str,
    pub unit: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default: f64,
    pub range_hint: String,
}

impl From<&FeatureSpec> for FeatureField {
    fn from(spec: &FeatureSpec) -> Self {
        Self {
            key: spec.key,
            label: spec.display_label(),
            description: spec.description,
            unit: spec.unit,
            min: spec.safe_range.min,
            max: spec.safe_range.max,
            default: spec.default,
            range_hint: spec.range_hint(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub variant: Variant,
    pub title: &'static str,
    pub unit: &'static str,
    pub features: Vec<FeatureField>,
}

// === Prediction ===

/// Numbers or numeric text; text goes through the same parsing as the form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    pub fn into_text(self) -> String {
        match self {
            InputValue::Number(n) => n.to_string(),
            InputValue::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Missing keys take their defaults.
    #[serde(default)]
    pub values: BTreeMap<String, InputValue>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub submission_id: Uuid,
    pub value: f64,
    pub unit: &'static str,
    pub display: String,
    pub inputs: FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importances: Option<Vec<FeatureImportance>>,
    pub advisories: Vec<String>,
}

// === Health ===

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub variant: Variant,
    pub model_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

//! Serialized model artifact.
//!
//! The on-disk JSON document is described by the `*Schema` types and turned
//! into a validated [`ArtifactModel`] before anything can predict with it.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "co2-per-capita",
//!   "target": "CO2 emissions per capita (metric tons)",
//!   "feature_names": ["cereal_yield", "gdp"],
//!   "estimator": { "type": "linear", "intercept": 0.4, "coefficients": [0.001, 0.002] }
//! }
//! ```

use co2cast_core::{check_columns, FeatureFrame, LoadError, PredictionError, Predictor};
use serde::{Deserialize, Serialize};

use crate::forest::{Aggregation, Forest, Node, Tree};
use crate::linear::LinearModel;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSchema {
    pub format_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    pub feature_names: Vec<String>,
    pub estimator: EstimatorSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSchema {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    Forest {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeSchema>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSchema {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Estimator {
    Linear(LinearModel),
    Forest(Forest),
}

/// Validated model ready for inference.
#[derive(Debug, Clone)]
pub struct ArtifactModel {
    name: String,
    target: Option<String>,
    feature_names: Vec<String>,
    estimator: Estimator,
    importances: Option<Vec<f64>>,
}

impl ArtifactModel {
    pub fn from_json(content: &str) -> Result<Self, LoadError> {
        let schema: ArtifactSchema =
            serde_json::from_str(content).map_err(|e| LoadError::Malformed(e.to_string()))?;
        Self::from_schema(schema)
    }

    pub fn from_schema(schema: ArtifactSchema) -> Result<Self, LoadError> {
        if schema.format_version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: schema.format_version,
                supported: FORMAT_VERSION,
            });
        }

        let n_features = schema.feature_names.len();
        if n_features == 0 {
            return Err(malformed("feature_names is empty"));
        }
        for (i, name) in schema.feature_names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(malformed(format!("feature name {} is empty", i)));
            }
            if schema.feature_names[..i].contains(name) {
                return Err(malformed(format!("duplicate feature name '{}'", name)));
            }
        }

        let estimator = match schema.estimator {
            EstimatorSchema::Linear {
                intercept,
                coefficients,
            } => Estimator::Linear(LinearModel::new(intercept, coefficients, n_features)?),
            EstimatorSchema::Forest {
                aggregation,
                base_score,
                trees,
            } => {
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, t)| {
                        Tree::new(t.nodes, n_features)
                            .map_err(|e| malformed(format!("tree {}: {}", i, e)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Estimator::Forest(Forest::new(trees, aggregation, base_score)?)
            }
        };

        let importances = match (schema.feature_importances, &estimator) {
            (Some(weights), _) => {
                if weights.len() != n_features {
                    return Err(malformed(format!(
                        "{} feature_importances for {} features",
                        weights.len(),
                        n_features
                    )));
                }
                if weights.iter().any(|w| !w.is_finite()) {
                    return Err(malformed("feature_importances must be finite"));
                }
                Some(weights)
            }
            (None, Estimator::Forest(forest)) => Some(forest.split_importances(n_features)),
            (None, Estimator::Linear(_)) => None,
        };

        Ok(Self {
            name: schema.name.unwrap_or_else(|| "unnamed".to_string()),
            target: schema.target,
            feature_names: schema.feature_names,
            estimator,
            importances,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn kind(&self) -> &'static str {
        match self.estimator {
            Estimator::Linear(_) => "linear",
            Estimator::Forest(_) => "forest",
        }
    }
}

fn malformed(msg: impl Into<String>) -> LoadError {
    LoadError::Malformed(msg.into())
}

impl Predictor for ArtifactModel {
    fn describe(&self) -> String {
        let shape = match &self.estimator {
            Estimator::Linear(_) => format!("linear, {} features", self.feature_names.len()),
            Estimator::Forest(f) => format!(
                "forest of {} trees / {} nodes, {} features",
                f.n_trees(),
                f.n_nodes(),
                self.feature_names.len()
            ),
        };
        match self.target() {
            Some(target) => format!("{} ({}) -> {}", self.name, shape, target),
            None => format!("{} ({})", self.name, shape),
        }
    }

    fn expected_columns(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<f64, PredictionError> {
        check_columns(&self.feature_names, frame.columns())?;
        let row = frame.row();
        if let Some(i) = row.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::Inference(format!(
                "feature '{}' is not a finite number",
                self.feature_names[i]
            )));
        }

        Ok(match &self.estimator {
            Estimator::Linear(linear) => linear.predict(row),
            Estimator::Forest(forest) => forest.predict(row),
        })
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}

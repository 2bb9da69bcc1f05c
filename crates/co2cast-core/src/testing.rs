//! Model stubs shared by unit tests.

use crate::error::PredictionError;
use crate::feature::FeatureFrame;
use crate::predictor::{check_columns, Predictor};

/// Returns the same value for any input.
pub struct FixedModel(pub f64);

impl Predictor for FixedModel {
    fn predict(&self, _frame: &FeatureFrame) -> Result<f64, PredictionError> {
        Ok(self.0)
    }
}

/// Always raises during inference.
pub struct FailingModel;

impl Predictor for FailingModel {
    fn predict(&self, _frame: &FeatureFrame) -> Result<f64, PredictionError> {
        Err(PredictionError::Inference("model exploded".to_string()))
    }
}

/// Dot product with fixed weights.
pub struct WeightedModel {
    weights: Vec<f64>,
    importances: Option<Vec<f64>>,
}

impl WeightedModel {
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            importances: None,
        }
    }

    pub fn with_importances(mut self, importances: Vec<f64>) -> Self {
        self.importances = Some(importances);
        self
    }
}

impl Predictor for WeightedModel {
    fn predict(&self, frame: &FeatureFrame) -> Result<f64, PredictionError> {
        if frame.n_columns() != self.weights.len() {
            return Err(PredictionError::ColumnCount {
                expected: self.weights.len(),
                actual: frame.n_columns(),
            });
        }
        Ok(frame.row().iter().zip(&self.weights).map(|(x, w)| x * w).sum())
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}

/// Rejects frames whose columns are not in its training order.
pub struct OrderedModel {
    columns: Vec<String>,
    declare: bool,
}

impl OrderedModel {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            declare: false,
        }
    }

    /// Also expose the columns through `expected_columns`.
    pub fn declaring(mut self) -> Self {
        self.declare = true;
        self
    }
}

impl Predictor for OrderedModel {
    fn expected_columns(&self) -> Option<&[String]> {
        self.declare.then_some(self.columns.as_slice())
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<f64, PredictionError> {
        check_columns(&self.columns, frame.columns())?;
        Ok(frame.row().iter().sum())
    }
}

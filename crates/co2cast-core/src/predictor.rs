use std::sync::Arc;

use crate::error::PredictionError;
use crate::feature::FeatureFrame;

/// A loaded, read-only prediction model.
pub trait Predictor: Send + Sync {
    /// Short description for status output.
    fn describe(&self) -> String {
        "opaque model".to_string()
    }

    /// Column names in training order, when the model declares them up front.
    fn expected_columns(&self) -> Option<&[String]> {
        None
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<f64, PredictionError>;

    /// Per-feature weights in training order.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

/// Shared handle to the one model loaded for this process.
pub type ModelHandle = Arc<dyn Predictor>;

/// Columns must match in count, name and order.
pub fn check_columns(expected: &[String], actual: &[String]) -> Result<(), PredictionError> {
    if expected.len() != actual.len() {
        return Err(PredictionError::ColumnCount {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    for (position, (want, got)) in expected.iter().zip(actual).enumerate() {
        if want != got {
            return Err(PredictionError::ColumnName {
                position,
                expected: want.clone(),
                actual: got.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_check_columns_ok() {
        assert!(check_columns(&cols(&["a", "b"]), &cols(&["a", "b"])).is_ok());
    }

    #[test]
    fn test_check_columns_count() {
        assert_eq!(
            check_columns(&cols(&["a", "b"]), &cols(&["a"])),
            Err(PredictionError::ColumnCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_check_columns_order() {
        let err = check_columns(&cols(&["a", "b"]), &cols(&["b", "a"])).unwrap_err();
        assert_eq!(
            err,
            PredictionError::ColumnName {
                position: 0,
                expected: "a".to_string(),
                actual: "b".to_string()
            }
        );
    }
}

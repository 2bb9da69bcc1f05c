use co2cast_core::LoadError;

/// `intercept + Σ coefficient_i · x_i`
#[derive(Debug, Clone)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>, n_features: usize) -> Result<Self, LoadError> {
        if coefficients.len() != n_features {
            return Err(LoadError::Malformed(format!(
                "{} coefficients for {} features",
                coefficients.len(),
                n_features
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(LoadError::Malformed("linear weights must be finite".to_string()));
        }
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

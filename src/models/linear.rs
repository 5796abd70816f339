//! Ordinary least squares with an intercept.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::math::solve_least_squares;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Fit on `x` (rows = samples) and `y`.
    pub fn fit(x: &DMatrix<f64>, y: &[f64]) -> Result<Self, PipelineError> {
        let (n, p) = x.shape();
        if n == 0 || n != y.len() {
            return Err(PipelineError::prediction(format!(
                "Linear fit needs matching non-empty inputs (rows={n}, targets={})",
                y.len()
            )));
        }

        let mut design = DMatrix::<f64>::zeros(n, p + 1);
        design.column_mut(0).fill(1.0);
        design.columns_mut(1, p).copy_from(x);

        let target = DVector::from_column_slice(y);
        let beta = solve_least_squares(&design, &target)
            .ok_or_else(|| PipelineError::prediction("Least squares solve failed (ill-conditioned design)"))?;

        Ok(Self {
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
        })
    }

    /// Check a model that came from outside this process (e.g. disk).
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite())) {
            return Err(PipelineError::artifact("Linear model has non-finite coefficients"));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(row).map(|(b, x)| b * x).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_linear_relation() {
        // y = 1000 + 2*a - 5*b
        let x = DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 3.0, 2.0]);
        let y = [1000.0, 1002.0, 995.0, 996.0];

        let model = LinearModel::fit(&x, &y).unwrap();
        assert!((model.intercept - 1000.0).abs() < 1e-6);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-6);
        assert!((model.coefficients[1] + 5.0).abs() < 1e-6);
        assert!((model.predict_row(&[1.0, 1.0]) - 997.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_mismatched_targets() {
        let x = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
        assert!(LinearModel::fit(&x, &[1.0]).is_err());
    }

    #[test]
    fn validate_rejects_non_finite_coefficients() {
        let mut model = LinearModel {
            intercept: 1.0,
            coefficients: vec![2.0, 3.0],
        };
        assert!(model.validate().is_ok());
        model.coefficients[1] = f64::NAN;
        assert!(matches!(model.validate(), Err(PipelineError::Artifact(_))));
    }
}

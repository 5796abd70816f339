//! Regression models trained on the encoded feature matrix.
//!
//! - `linear`: OLS with intercept (the simple pipeline's regressor)
//! - `forest`: random forest (the "improved" regressor)
//! - `bundle`: a model together with the encoder artifacts it was trained against

pub mod bundle;
pub mod forest;
pub mod linear;

pub use bundle::*;
pub use forest::*;
pub use linear::*;

use serde::{Deserialize, Serialize};

use crate::domain::{ForestParams, ModelSpec};
use crate::error::PipelineError;
use crate::pipeline::FeatureMatrix;

/// Any of the supported regressors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegressionModel {
    Linear(LinearModel),
    Forest(ForestModel),
}

impl RegressionModel {
    pub fn fit(
        spec: ModelSpec,
        x: &FeatureMatrix,
        y: &[f64],
        forest: &ForestParams,
    ) -> Result<Self, PipelineError> {
        match spec {
            ModelSpec::Linear => Ok(RegressionModel::Linear(LinearModel::fit(x.values(), y)?)),
            ModelSpec::Forest => Ok(RegressionModel::Forest(ForestModel::fit(x.values(), y, forest)?)),
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(&self) -> &'static str {
        match self {
            RegressionModel::Linear(_) => "Linear regression",
            RegressionModel::Forest(_) => "Random forest",
        }
    }

    /// Width of the feature vectors this model was trained on.
    pub fn n_features(&self) -> usize {
        match self {
            RegressionModel::Linear(m) => m.n_features(),
            RegressionModel::Forest(m) => m.n_features(),
        }
    }

    /// Structural check for a model read back from an artifact.
    pub fn validate(&self) -> Result<(), PipelineError> {
        match self {
            RegressionModel::Linear(m) => m.validate(),
            RegressionModel::Forest(m) => m.validate(),
        }
    }

    /// Predict a single encoded row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, PipelineError> {
        if row.len() != self.n_features() {
            return Err(PipelineError::prediction(format!(
                "Feature vector has {} values, model expects {}",
                row.len(),
                self.n_features()
            )));
        }
        let y = match self {
            RegressionModel::Linear(m) => m.predict_row(row),
            RegressionModel::Forest(m) => m.predict_row(row),
        };
        if !y.is_finite() {
            return Err(PipelineError::prediction("Model produced a non-finite prediction"));
        }
        Ok(y)
    }

    /// Predict every row of a feature matrix.
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>, PipelineError> {
        (0..x.nrows()).map(|i| self.predict_row(&x.row(i))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_mismatch_is_a_prediction_error() {
        let model = RegressionModel::Linear(LinearModel {
            intercept: 1.0,
            coefficients: vec![1.0, 2.0],
        });
        assert_eq!(model.predict_row(&[1.0, 1.0]).unwrap(), 4.0);
        assert!(matches!(model.predict_row(&[1.0]), Err(PipelineError::Prediction(_))));
    }

    #[test]
    fn non_finite_output_is_a_prediction_error() {
        let model = RegressionModel::Linear(LinearModel {
            intercept: f64::INFINITY,
            coefficients: vec![0.0],
        });
        assert!(matches!(model.predict_row(&[0.0]), Err(PipelineError::Prediction(_))));
    }
}

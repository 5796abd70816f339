//! A trained model bundled with the encoder artifacts it depends on.
//!
//! The bundle is the unit that gets persisted and loaded. Construction checks
//! that the pieces agree with each other, so a loaded bundle can be shared
//! read-only across any number of prediction requests.

use rayon::prelude::*;

use crate::domain::{EvalMetrics, PipelineVariant, SalaryRecord};
use crate::error::PipelineError;
use crate::models::RegressionModel;
use crate::pipeline::{CategoryVocabulary, FeatureMatrix, NumericNormalizer, apply_encode, encode_record, feature_layout};

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    variant: PipelineVariant,
    model: RegressionModel,
    vocabulary: CategoryVocabulary,
    normalizer: Option<NumericNormalizer>,
    feature_names: Vec<String>,
    metrics: Option<EvalMetrics>,
}

impl ArtifactBundle {
    /// Assemble a bundle, checking that the parts are mutually consistent:
    ///
    /// - a normalizer is present iff the variant standardizes
    /// - model, vocabulary and normalizer are well-formed
    /// - the model's input width matches the encoder's output width
    pub fn new(
        variant: PipelineVariant,
        model: RegressionModel,
        vocabulary: CategoryVocabulary,
        normalizer: Option<NumericNormalizer>,
        metrics: Option<EvalMetrics>,
    ) -> Result<Self, PipelineError> {
        match (variant.standardizes(), normalizer.is_some()) {
            (true, false) => {
                return Err(PipelineError::artifact(
                    "Standardized pipeline requires a fitted normalizer",
                ));
            }
            (false, true) => {
                return Err(PipelineError::artifact(
                    "Basic pipeline must not carry a normalizer",
                ));
            }
            _ => {}
        }

        model.validate()?;
        vocabulary.validate()?;
        if let Some(n) = &normalizer {
            n.validate()?;
        }

        let feature_names = feature_layout(&vocabulary);
        if model.n_features() != feature_names.len() {
            return Err(PipelineError::artifact(format!(
                "Model expects {} features but the encoder produces {}",
                model.n_features(),
                feature_names.len()
            )));
        }

        Ok(Self {
            variant,
            model,
            vocabulary,
            normalizer,
            feature_names,
            metrics,
        })
    }

    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    pub fn model(&self) -> &RegressionModel {
        &self.model
    }

    pub fn vocabulary(&self) -> &CategoryVocabulary {
        &self.vocabulary
    }

    pub fn normalizer(&self) -> Option<&NumericNormalizer> {
        self.normalizer.as_ref()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn metrics(&self) -> Option<&EvalMetrics> {
        self.metrics.as_ref()
    }

    /// Encode records with the bundled (never refitted) encoder.
    pub fn encode(&self, records: &[SalaryRecord]) -> Result<FeatureMatrix, PipelineError> {
        apply_encode(records, &self.vocabulary, self.normalizer.as_ref())
    }

    /// Encode and predict one record.
    pub fn predict_record(&self, record: &SalaryRecord) -> Result<f64, PipelineError> {
        let row = encode_record(record, &self.vocabulary, self.normalizer.as_ref())?;
        self.model.predict_row(&row)
    }

    /// Predict many independent records in parallel.
    ///
    /// One result per input, in input order; a failure affects only its own record.
    pub fn predict_many(&self, records: &[SalaryRecord]) -> Vec<Result<f64, PipelineError>> {
        records.par_iter().map(|r| self.predict_record(r)).collect()
    }
}

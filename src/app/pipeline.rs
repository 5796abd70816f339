//! Shared train / predict workflows used by the CLI commands.
//!
//! Training: CSV -> clean -> split -> encode (fit) -> hold-out split -> fit model
//! -> evaluate -> persist. Prediction: load artifacts once -> encode (apply) ->
//! predict.
//!
//! The `*_on_table` / `predict_table` variants take in-memory data and return
//! [`PipelineError`] so they can be tested without touching the filesystem.

use std::path::Path;

use crate::domain::{EvalMetrics, FormInput, PredictConfig, RowError, SalaryRecord, Table, TrainConfig};
use crate::error::{AppError, PipelineError};
use crate::io::{load_bundle, read_table, save_bundle, write_eval_csv, write_predictions_csv};
use crate::math::{r2_score, rmse};
use crate::models::{ArtifactBundle, RegressionModel};
use crate::pipeline::{OutlierFilter, clean, fit_encode, split, train_test_split};

/// All computed outputs of a single `salary train` run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub rows_read: usize,
    pub rows_clean: usize,
    pub bundle: ArtifactBundle,
    pub metrics: EvalMetrics,
    pub test_actual: Vec<f64>,
    pub test_predicted: Vec<f64>,
}

/// Outputs of a batch prediction.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub rows_read: usize,
    /// `(0-based data row, predicted salary)` for every row that succeeded.
    pub predictions: Vec<(usize, f64)>,
    pub row_errors: Vec<RowError>,
}

/// Train from the configured CSV and persist the artifacts.
pub fn run_train(config: &TrainConfig) -> Result<TrainOutput, AppError> {
    let raw = read_table(&config.csv_path)?;
    let output = train_on_table(&raw, config)?;

    save_bundle(&output.bundle, &config.artifact_dir)?;
    if let Some(path) = &config.export_predictions {
        write_eval_csv(path, &output.test_actual, &output.test_predicted)?;
        tracing::info!(path = %path.display(), "wrote hold-out predictions");
    }

    Ok(output)
}

/// Train on an in-memory raw table (nothing is persisted).
pub fn train_on_table(raw: &Table, config: &TrainConfig) -> Result<TrainOutput, PipelineError> {
    let outliers = if config.variant.filters_outliers() {
        OutlierFilter::Cutoff
    } else {
        OutlierFilter::Off
    };

    let cleaned = clean(raw, outliers)?;
    if cleaned.is_empty() {
        return Err(PipelineError::feature(format!(
            "No training rows left after cleaning ({} read)",
            raw.len()
        )));
    }
    let (features, target) = split(&cleaned)?;
    let records = features.to_records()?;

    // The encoder is fitted on every cleaned row before the hold-out split, so
    // the vocabulary covers categories that only occur in the test rows.
    let (matrix, vocabulary, normalizer) = fit_encode(&records, config.variant.standardizes())?;

    let (train_idx, test_idx) = train_test_split(matrix.nrows(), config.test_fraction, config.split_seed)?;
    let x_train = matrix.select_rows(&train_idx);
    let y_train = pick(&target, &train_idx);
    let x_test = matrix.select_rows(&test_idx);
    let y_test = pick(&target, &test_idx);

    tracing::info!(
        model = ?config.model,
        variant = ?config.variant,
        train = train_idx.len(),
        test = test_idx.len(),
        features = matrix.ncols(),
        "fitting model"
    );
    let model = RegressionModel::fit(config.model, &x_train, &y_train, &config.forest)?;
    let predicted = model.predict(&x_test)?;

    let metrics = EvalMetrics {
        rmse: rmse(&y_test, &predicted),
        r2: r2_score(&y_test, &predicted),
        n_train: train_idx.len(),
        n_test: test_idx.len(),
    };
    tracing::info!(rmse = metrics.rmse, r2 = metrics.r2, "evaluated on hold-out rows");

    let bundle = ArtifactBundle::new(config.variant, model, vocabulary, normalizer, Some(metrics))?;

    Ok(TrainOutput {
        rows_read: raw.len(),
        rows_clean: cleaned.len(),
        bundle,
        metrics,
        test_actual: y_test,
        test_predicted: predicted,
    })
}

/// Predict a single form submission.
pub fn run_predict(config: &PredictConfig, input: &FormInput) -> Result<f64, AppError> {
    let bundle = load_bundle(&config.artifact_dir)?;
    let salary = bundle.predict_record(&SalaryRecord::from(input))?;
    tracing::debug!(salary, "predicted");
    Ok(salary)
}

/// Predict every row of a CSV, optionally writing the results to `output`.
pub fn run_batch(config: &PredictConfig, input: &Path, output: Option<&Path>) -> Result<BatchOutput, AppError> {
    let bundle = load_bundle(&config.artifact_dir)?;
    let table = read_table(input)?;
    let batch = predict_table(&bundle, &table)?;

    if batch.predictions.is_empty() && batch.rows_read > 0 {
        return Err(AppError::new(
            2,
            format!("None of the {} rows could be predicted.", batch.rows_read),
        ));
    }

    if let Some(path) = output {
        write_predictions_csv(path, &batch.predictions)?;
        tracing::info!(path = %path.display(), rows = batch.predictions.len(), "wrote predictions");
    }

    Ok(batch)
}

/// Predict every row of an in-memory table against a loaded bundle.
///
/// A row with a missing or malformed field is rejected as a whole and reported
/// in `row_errors`; the other rows are unaffected.
pub fn predict_table(bundle: &ArtifactBundle, table: &Table) -> Result<BatchOutput, PipelineError> {
    let (records, mut row_errors) = table.to_records_lenient()?;
    let (rows, records): (Vec<usize>, Vec<SalaryRecord>) = records.into_iter().unzip();

    let mut predictions = Vec::with_capacity(rows.len());
    for (row, result) in rows.into_iter().zip(bundle.predict_many(&records)) {
        match result {
            Ok(value) => predictions.push((row, value)),
            Err(e) => row_errors.push(RowError {
                row,
                message: e.to_string(),
            }),
        }
    }
    row_errors.sort_by_key(|e| e.row);

    if !row_errors.is_empty() {
        tracing::warn!(rejected = row_errors.len(), "some rows were rejected");
    }

    Ok(BatchOutput {
        rows_read: table.len(),
        predictions,
        row_errors,
    })
}

fn pick(values: &[f64], idx: &[usize]) -> Vec<f64> {
    idx.iter().map(|&i| values[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForestParams, KEEP_COLUMNS, ModelSpec, PipelineVariant, Row};

    fn config(variant: PipelineVariant) -> TrainConfig {
        TrainConfig {
            csv_path: "unused.csv".into(),
            artifact_dir: "unused".into(),
            variant,
            model: ModelSpec::Linear,
            forest: ForestParams::default(),
            test_fraction: 0.2,
            split_seed: 42,
            export_predictions: None,
        }
    }

    fn table(targets: &[&str]) -> Table {
        let rows = targets
            .iter()
            .map(|t| -> Row {
                ["2024", "SE", "FT", "Data Engineer", *t, "US", "50", "US", "M"]
                    .iter()
                    .map(|c| Some((*c).to_string()))
                    .collect()
            })
            .collect();
        Table::new(KEEP_COLUMNS.iter().map(|c| (*c).to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn training_fails_when_cleaning_leaves_nothing() {
        let err = train_on_table(&table(&["400000", "500000"]), &config(PipelineVariant::Standardized)).unwrap_err();
        assert!(matches!(err, PipelineError::Feature(ref m) if m.contains("after cleaning")), "{err}");
    }

    #[test]
    fn basic_variant_keeps_high_targets() {
        let output = train_on_table(
            &table(&["400000", "500000", "120000"]),
            &config(PipelineVariant::Basic),
        )
        .unwrap();
        assert_eq!(output.rows_clean, 3);
        assert_eq!(output.metrics.n_test, 1);
    }
}

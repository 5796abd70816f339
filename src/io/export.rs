//! CSV exports: held-out evaluation rows and batch predictions.

use std::path::Path;

use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Serialize)]
struct EvalRow {
    actual: f64,
    predicted: f64,
    residual: f64,
}

#[derive(Debug, Serialize)]
struct PredictionRow {
    row: usize,
    predicted_salary_usd: i64,
}

/// Write `actual,predicted,residual` for each held-out row.
pub fn write_eval_csv(path: &Path, actual: &[f64], predicted: &[f64]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    for (&actual, &predicted) in actual.iter().zip(predicted) {
        writer
            .serialize(EvalRow {
                actual,
                predicted,
                residual: actual - predicted,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    flush(writer)
}

/// Write `row,predicted_salary_usd` pairs (row = 0-based input data row).
pub fn write_predictions_csv(path: &Path, predictions: &[(usize, f64)]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    for &(row, value) in predictions {
        writer
            .serialize(PredictionRow {
                row,
                predicted_salary_usd: value.round() as i64,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write prediction CSV row: {e}")))?;
    }
    flush(writer)
}

fn create_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, AppError> {
    csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))
}

fn flush(mut writer: csv::Writer<std::fs::File>) -> Result<(), AppError> {
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))
}

//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline code stays free of presentation
//! concerns and output changes are localized.

use crate::app::pipeline::{BatchOutput, TrainOutput};
use crate::domain::{FormInput, TrainConfig};
use crate::models::ArtifactBundle;

/// Format the result of a training run.
pub fn format_train_summary(output: &TrainOutput, config: &TrainConfig) -> String {
    let mut out = String::new();
    let bundle = &output.bundle;

    out.push_str("=== salary - model training ===\n");
    out.push_str(&format!("Data: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "Rows: read={} | after cleaning={}\n",
        output.rows_read, output.rows_clean
    ));
    out.push_str(&format!(
        "Pipeline: {:?} | model: {}\n",
        bundle.variant(),
        bundle.model().display_name()
    ));
    out.push_str(&format!("Features: {}\n", bundle.feature_names().len()));

    out.push_str("\nHold-out evaluation:\n");
    out.push_str(&format!(
        "- train={} test={}\n",
        output.metrics.n_train, output.metrics.n_test
    ));
    out.push_str(&format!("- RMSE: {:.2}\n", output.metrics.rmse));
    out.push_str(&format!("- R2 Score: {:.4}\n", output.metrics.r2));

    out.push_str(&format!("\nArtifacts saved to {}\n", config.artifact_dir.display()));
    out
}

/// Format a single prediction together with the input it was made for.
pub fn format_prediction(input: &FormInput, salary: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!("Predicted salary (USD/year): {}\n", format_usd(salary)));
    out.push_str("\nInput:\n");
    out.push_str(&format!("  work_year          {}\n", input.work_year));
    out.push_str(&format!("  experience_level   {}\n", input.experience_level.code()));
    out.push_str(&format!("  employment_type    {}\n", input.employment_type.code()));
    out.push_str(&format!("  job_title          {}\n", input.job_title));
    out.push_str(&format!("  employee_residence {}\n", input.employee_residence));
    out.push_str(&format!("  remote_ratio       {}\n", input.remote_ratio.percent()));
    out.push_str(&format!("  company_location   {}\n", input.company_location));
    out.push_str(&format!("  company_size       {}\n", input.company_size.code()));
    out
}

/// Format a batch run: counts plus one line per rejected row.
pub fn format_batch_summary(batch: &BatchOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Rows: read={} | predicted={} | rejected={}\n",
        batch.rows_read,
        batch.predictions.len(),
        batch.row_errors.len()
    ));
    for e in &batch.row_errors {
        out.push_str(&format!("  row {}: {}\n", e.row, e.message));
    }
    out
}

/// Describe a loaded artifact bundle.
pub fn format_bundle(bundle: &ArtifactBundle) -> String {
    let mut out = String::new();
    out.push_str(&format!("Pipeline: {:?}\n", bundle.variant()));
    out.push_str(&format!("Model: {}\n", bundle.model().display_name()));
    if let Some(m) = bundle.metrics() {
        out.push_str(&format!(
            "Hold-out: RMSE={:.2} R2={:.4} (train={} test={})\n",
            m.rmse, m.r2, m.n_train, m.n_test
        ));
    }
    if let Some(normalizer) = bundle.normalizer() {
        for s in normalizer.stats() {
            out.push_str(&format!(
                "Scaler: {:<12} mean={:.4} std={:.4}\n",
                s.column.name(),
                s.mean,
                s.std
            ));
        }
    }

    out.push_str(&format!("\nFeatures ({}):\n", bundle.feature_names().len()));
    for (i, name) in bundle.feature_names().iter().enumerate() {
        out.push_str(&format!("{i:>4}  {name}\n"));
    }
    out
}

/// Round to whole dollars and group thousands: `123456.7` -> `$123,457`.
pub fn format_usd(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompanySize, EmploymentType, ExperienceLevel, RemoteRatio, RowError};

    #[test]
    fn usd_is_rounded_and_grouped() {
        assert_eq!(format_usd(123_456.7), "$123,457");
        assert_eq!(format_usd(999.4), "$999");
        assert_eq!(format_usd(1_000.0), "$1,000");
        assert_eq!(format_usd(0.2), "$0");
        assert_eq!(format_usd(-12_345.0), "-$12,345");
        assert_eq!(format_usd(1_234_567.0), "$1,234,567");
    }

    #[test]
    fn prediction_lists_the_input() {
        let input = FormInput {
            work_year: 2024,
            remote_ratio: RemoteRatio::Remote,
            experience_level: ExperienceLevel::Ex,
            employment_type: EmploymentType::Ct,
            job_title: "Data Architect".to_string(),
            employee_residence: "DE".to_string(),
            company_location: "FR".to_string(),
            company_size: CompanySize::L,
        };
        let text = format_prediction(&input, 150_000.4);
        assert!(text.starts_with("Predicted salary (USD/year): $150,000\n"));
        assert!(text.contains("remote_ratio       100"));
        assert!(text.contains("company_location   FR"));
    }

    #[test]
    fn batch_summary_lists_rejected_rows() {
        let batch = BatchOutput {
            rows_read: 3,
            predictions: vec![(0, 1.0), (2, 2.0)],
            row_errors: vec![RowError {
                row: 1,
                message: "feature error: missing".to_string(),
            }],
        };
        let text = format_batch_summary(&batch);
        assert!(text.contains("read=3 | predicted=2 | rejected=1"));
        assert!(text.contains("row 1: feature error: missing"));
    }
}

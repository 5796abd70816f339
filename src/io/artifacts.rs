//! Read/write the persisted pipeline artifacts.
//!
//! An artifact directory holds three independently serialized JSON files:
//!
//! - `model.json`: the fitted regressor plus the feature names it was trained on
//! - `encoder.json`: the categorical vocabulary
//! - `scaler.json`: the numeric normalizer (standardized pipeline only)
//!
//! Every file carries the same header (`tool`, `schema_version`, `variant`).
//! Loading reads all files once and refuses any combination that does not line
//! up, since a silently misaligned feature layout produces wrong salaries
//! rather than an error.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{EvalMetrics, PipelineVariant};
use crate::error::PipelineError;
use crate::models::{ArtifactBundle, RegressionModel};
use crate::pipeline::{CategoryVocabulary, NumericNormalizer};

/// Tool name written into every artifact.
pub const TOOL: &str = "salary";

/// Bumped whenever the on-disk layout of any artifact changes.
pub const SCHEMA_VERSION: u32 = 1;

pub const MODEL_FILE: &str = "model.json";
pub const ENCODER_FILE: &str = "encoder.json";
pub const SCALER_FILE: &str = "scaler.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub tool: String,
    pub schema_version: u32,
    pub variant: PipelineVariant,
    pub created_at: DateTime<Utc>,
}

impl ArtifactHeader {
    fn current(variant: PipelineVariant) -> Self {
        Self {
            tool: TOOL.to_string(),
            schema_version: SCHEMA_VERSION,
            variant,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(flatten)]
    pub header: ArtifactHeader,
    pub feature_names: Vec<String>,
    pub metrics: Option<EvalMetrics>,
    pub model: RegressionModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderFile {
    #[serde(flatten)]
    pub header: ArtifactHeader,
    pub vocabulary: CategoryVocabulary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerFile {
    #[serde(flatten)]
    pub header: ArtifactHeader,
    pub normalizer: NumericNormalizer,
}

/// Write a bundle into `dir` (created if needed).
///
/// A stale `scaler.json` left over from a standardized run is removed when
/// saving a basic bundle, so the directory never mixes pipeline variants.
pub fn save_bundle(bundle: &ArtifactBundle, dir: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        PipelineError::artifact(format!("Failed to create artifact dir '{}': {e}", dir.display()))
    })?;

    let header = ArtifactHeader::current(bundle.variant());

    write_json(
        &dir.join(MODEL_FILE),
        &ModelFile {
            header: header.clone(),
            feature_names: bundle.feature_names().to_vec(),
            metrics: bundle.metrics().copied(),
            model: bundle.model().clone(),
        },
    )?;
    write_json(
        &dir.join(ENCODER_FILE),
        &EncoderFile {
            header: header.clone(),
            vocabulary: bundle.vocabulary().clone(),
        },
    )?;

    let scaler_path = dir.join(SCALER_FILE);
    match bundle.normalizer() {
        Some(normalizer) => write_json(
            &scaler_path,
            &ScalerFile {
                header,
                normalizer: normalizer.clone(),
            },
        )?,
        None if scaler_path.exists() => std::fs::remove_file(&scaler_path).map_err(|e| {
            PipelineError::artifact(format!("Failed to remove stale '{}': {e}", scaler_path.display()))
        })?,
        None => {}
    }

    tracing::info!(dir = %dir.display(), variant = ?bundle.variant(), "saved artifacts");
    Ok(())
}

/// Load and cross-check the artifacts in `dir`.
pub fn load_bundle(dir: &Path) -> Result<ArtifactBundle, PipelineError> {
    let model: ModelFile = read_json(&dir.join(MODEL_FILE))?;
    let encoder: EncoderFile = read_json(&dir.join(ENCODER_FILE))?;

    check_header(&model.header, MODEL_FILE)?;
    check_header(&encoder.header, ENCODER_FILE)?;

    let variant = model.header.variant;
    if encoder.header.variant != variant {
        return Err(PipelineError::artifact(format!(
            "{ENCODER_FILE} was written by the {:?} pipeline but {MODEL_FILE} by the {variant:?} pipeline",
            encoder.header.variant
        )));
    }

    let scaler_path = dir.join(SCALER_FILE);
    let normalizer = if variant.standardizes() {
        let scaler: ScalerFile = read_json(&scaler_path)?;
        check_header(&scaler.header, SCALER_FILE)?;
        if scaler.header.variant != variant {
            return Err(PipelineError::artifact(format!(
                "{SCALER_FILE} was written by the {:?} pipeline",
                scaler.header.variant
            )));
        }
        Some(scaler.normalizer)
    } else {
        if scaler_path.exists() {
            return Err(PipelineError::artifact(format!(
                "Unexpected {SCALER_FILE} next to a basic-pipeline model"
            )));
        }
        None
    };

    let bundle = ArtifactBundle::new(variant, model.model, encoder.vocabulary, normalizer, model.metrics)?;

    if bundle.feature_names() != model.feature_names.as_slice() {
        return Err(PipelineError::artifact(
            "Model was trained on a different feature layout than the encoder produces",
        ));
    }

    tracing::info!(
        dir = %dir.display(),
        variant = ?variant,
        features = bundle.feature_names().len(),
        "loaded artifacts"
    );
    Ok(bundle)
}

fn check_header(header: &ArtifactHeader, file: &str) -> Result<(), PipelineError> {
    if header.tool != TOOL {
        return Err(PipelineError::artifact(format!(
            "{file} was not written by `{TOOL}` (tool = '{}')",
            header.tool
        )));
    }
    if header.schema_version != SCHEMA_VERSION {
        return Err(PipelineError::artifact(format!(
            "{file} has schema version {}, expected {SCHEMA_VERSION}",
            header.schema_version
        )));
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let file = File::create(path)
        .map_err(|e| PipelineError::artifact(format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| PipelineError::artifact(format!("Failed to write '{}': {e}", path.display())))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let file = File::open(path)
        .map_err(|e| PipelineError::artifact(format!("Failed to open '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PipelineError::artifact(format!("Invalid artifact '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForestParams, ModelSpec, SalaryRecord};
    use crate::models::LinearModel;
    use crate::pipeline::fit_encode;

    fn bundle(variant: PipelineVariant) -> ArtifactBundle {
        let records = records();
        let (matrix, vocabulary, normalizer) = fit_encode(&records, variant.standardizes()).unwrap();
        let model = RegressionModel::Linear(LinearModel {
            intercept: 90_000.0,
            coefficients: (0..matrix.ncols()).map(|i| i as f64).collect(),
        });
        ArtifactBundle::new(variant, model, vocabulary, normalizer, None).unwrap()
    }

    fn forest_bundle() -> ArtifactBundle {
        let (matrix, vocabulary, _) = fit_encode(&records(), false).unwrap();
        let params = ForestParams {
            n_estimators: 3,
            ..ForestParams::default()
        };
        let model = RegressionModel::fit(ModelSpec::Forest, &matrix, &[150_000.0, 60_000.0], &params).unwrap();
        ArtifactBundle::new(PipelineVariant::Basic, model, vocabulary, None, None).unwrap()
    }

    fn records() -> Vec<SalaryRecord> {
        vec![
            SalaryRecord {
                work_year: 2024.0,
                remote_ratio: 0.0,
                experience_level: "SE".to_string(),
                employment_type: "FT".to_string(),
                job_title: "Data Engineer".to_string(),
                employee_residence: "US".to_string(),
                company_location: "US".to_string(),
                company_size: "M".to_string(),
            },
            SalaryRecord {
                work_year: 2022.0,
                remote_ratio: 100.0,
                experience_level: "EN".to_string(),
                employment_type: "PT".to_string(),
                job_title: "Data Analyst".to_string(),
                employee_residence: "GB".to_string(),
                company_location: "GB".to_string(),
                company_size: "S".to_string(),
            },
        ]
    }

    fn tamper<F: FnOnce(&mut serde_json::Value)>(path: &Path, edit: F) {
        let text = std::fs::read_to_string(path).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        edit(&mut value);
        std::fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    #[test]
    fn standardized_bundle_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let original = bundle(PipelineVariant::Standardized);
        save_bundle(&original, dir.path()).unwrap();

        assert!(dir.path().join(SCALER_FILE).exists());
        assert_eq!(load_bundle(dir.path()).unwrap(), original);
    }

    #[test]
    fn basic_save_removes_stale_scaler() {
        let dir = tempfile::tempdir().unwrap();
        save_bundle(&bundle(PipelineVariant::Standardized), dir.path()).unwrap();
        save_bundle(&bundle(PipelineVariant::Basic), dir.path()).unwrap();

        assert!(!dir.path().join(SCALER_FILE).exists());
        assert_eq!(load_bundle(dir.path()).unwrap().variant(), PipelineVariant::Basic);
    }

    #[test]
    fn missing_scaler_is_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        save_bundle(&bundle(PipelineVariant::Standardized), dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

        assert!(matches!(load_bundle(dir.path()), Err(PipelineError::Artifact(_))));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        save_bundle(&bundle(PipelineVariant::Basic), dir.path()).unwrap();
        tamper(&dir.path().join(ENCODER_FILE), |v| v["schema_version"] = 99.into());

        let err = load_bundle(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(ref m) if m.contains("schema version 99")));
    }

    #[test]
    fn variant_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        save_bundle(&bundle(PipelineVariant::Basic), dir.path()).unwrap();
        tamper(&dir.path().join(ENCODER_FILE), |v| v["variant"] = "standardized".into());

        assert!(matches!(load_bundle(dir.path()), Err(PipelineError::Artifact(_))));
    }

    #[test]
    fn feature_layout_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        save_bundle(&bundle(PipelineVariant::Basic), dir.path()).unwrap();
        tamper(&dir.path().join(MODEL_FILE), |v| {
            v["feature_names"][0] = "remote_ratio".into();
            v["feature_names"][1] = "work_year".into();
        });

        let err = load_bundle(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(ref m) if m.contains("feature layout")));
    }

    #[test]
    fn forest_bundle_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let original = forest_bundle();
        save_bundle(&original, dir.path()).unwrap();
        assert_eq!(load_bundle(dir.path()).unwrap(), original);
    }

    #[test]
    fn cyclic_forest_tree_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        save_bundle(&forest_bundle(), dir.path()).unwrap();
        tamper(&dir.path().join(MODEL_FILE), |v| {
            v["model"]["trees"][0]["nodes"] = serde_json::json!([
                {"split": {"feature": 0, "threshold": 1.0, "left": 0, "right": 0}}
            ]);
        });

        let err = load_bundle(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(ref m) if m.contains("child index")), "{err}");
    }

    #[test]
    fn missing_directory_is_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bundle(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(_)));
    }
}

//! Shared domain types.
//!
//! The form-facing enums double as `clap` value enums so the CLI enforces the
//! same allow-lists the web form offered. The pipeline itself only ever sees
//! [`SalaryRecord`], whose categorical fields are plain strings: anything the
//! encoder has not seen during fitting is handled there, not here.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::schema::{CategoricalColumn, NumericColumn};

/// Country codes offered for `employee_residence` / `company_location`.
pub const COUNTRY_CODES: [&str; 9] = ["US", "GB", "IN", "CA", "DE", "FR", "VN", "JP", "AU"];

/// Job titles offered by the form.
pub const JOB_TITLES: [&str; 5] = [
    "Data Engineer",
    "Data Scientist",
    "Machine Learning Engineer",
    "Data Analyst",
    "Data Architect",
];

/// Inclusive bounds for `work_year` on the input form.
pub const WORK_YEAR_MIN: i32 = 2020;
pub const WORK_YEAR_MAX: i32 = 2025;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExperienceLevel {
    #[value(name = "EN")]
    En,
    #[value(name = "MI")]
    Mi,
    #[value(name = "SE")]
    Se,
    #[value(name = "EX")]
    Ex,
}

impl ExperienceLevel {
    pub fn code(self) -> &'static str {
        match self {
            ExperienceLevel::En => "EN",
            ExperienceLevel::Mi => "MI",
            ExperienceLevel::Se => "SE",
            ExperienceLevel::Ex => "EX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmploymentType {
    #[value(name = "FT")]
    Ft,
    #[value(name = "PT")]
    Pt,
    #[value(name = "CT")]
    Ct,
    #[value(name = "FL")]
    Fl,
}

impl EmploymentType {
    pub fn code(self) -> &'static str {
        match self {
            EmploymentType::Ft => "FT",
            EmploymentType::Pt => "PT",
            EmploymentType::Ct => "CT",
            EmploymentType::Fl => "FL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompanySize {
    #[value(name = "S")]
    S,
    #[value(name = "M")]
    M,
    #[value(name = "L")]
    L,
}

impl CompanySize {
    pub fn code(self) -> &'static str {
        match self {
            CompanySize::S => "S",
            CompanySize::M => "M",
            CompanySize::L => "L",
        }
    }
}

/// Share of remote work, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteRatio {
    #[value(name = "0")]
    OnSite,
    #[value(name = "50")]
    Hybrid,
    #[value(name = "100")]
    Remote,
}

impl RemoteRatio {
    pub fn percent(self) -> u32 {
        match self {
            RemoteRatio::OnSite => 0,
            RemoteRatio::Hybrid => 50,
            RemoteRatio::Remote => 100,
        }
    }
}

/// One job record with all 8 input attributes present.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    pub work_year: f64,
    pub remote_ratio: f64,
    pub experience_level: String,
    pub employment_type: String,
    pub job_title: String,
    pub employee_residence: String,
    pub company_location: String,
    pub company_size: String,
}

impl SalaryRecord {
    pub fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::WorkYear => self.work_year,
            NumericColumn::RemoteRatio => self.remote_ratio,
        }
    }

    pub fn categorical(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::ExperienceLevel => &self.experience_level,
            CategoricalColumn::EmploymentType => &self.employment_type,
            CategoricalColumn::JobTitle => &self.job_title,
            CategoricalColumn::EmployeeResidence => &self.employee_residence,
            CategoricalColumn::CompanyLocation => &self.company_location,
            CategoricalColumn::CompanySize => &self.company_size,
        }
    }
}

/// Validated form input, as collected by the `predict` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub work_year: i32,
    pub remote_ratio: RemoteRatio,
    pub experience_level: ExperienceLevel,
    pub employment_type: EmploymentType,
    pub job_title: String,
    pub employee_residence: String,
    pub company_location: String,
    pub company_size: CompanySize,
}

impl From<&FormInput> for SalaryRecord {
    fn from(input: &FormInput) -> Self {
        SalaryRecord {
            work_year: f64::from(input.work_year),
            remote_ratio: f64::from(input.remote_ratio.percent()),
            experience_level: input.experience_level.code().to_string(),
            employment_type: input.employment_type.code().to_string(),
            job_title: input.job_title.clone(),
            employee_residence: input.employee_residence.clone(),
            company_location: input.company_location.clone(),
            company_size: input.company_size.code().to_string(),
        }
    }
}

/// Which pipeline produced (or must consume) a set of artifacts.
///
/// The two variants persist different artifact sets, so they are never mixed:
/// every artifact records the variant it was written by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
    /// Raw numeric columns, no outlier filter, no scaler artifact.
    Basic,
    /// Standardized numeric columns and the outlier filter; writes `scaler.json`.
    Standardized,
}

impl PipelineVariant {
    pub fn standardizes(self) -> bool {
        matches!(self, PipelineVariant::Standardized)
    }

    pub fn filters_outliers(self) -> bool {
        matches!(self, PipelineVariant::Standardized)
    }
}

/// Which regressor to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelSpec {
    Linear,
    Forest,
}

/// Forest hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Hold-out evaluation of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub rmse: f64,
    pub r2: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// A training run's configuration, derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub csv_path: PathBuf,
    pub artifact_dir: PathBuf,
    pub variant: PipelineVariant,
    pub model: ModelSpec,
    pub forest: ForestParams,
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub split_seed: u64,
    pub export_predictions: Option<PathBuf>,
}

/// A prediction request's configuration.
#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub artifact_dir: PathBuf,
}

//! Command-line parsing for the salary predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline. The `predict` flags mirror the web input form, including its
//! allow-lists and defaults.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};

use crate::domain::{
    COUNTRY_CODES, CompanySize, EmploymentType, ExperienceLevel, JOB_TITLES, ModelSpec, PipelineVariant,
    RemoteRatio, WORK_YEAR_MAX, WORK_YEAR_MIN,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salary", version, about = "Data/ML job salary predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean a salary CSV, fit the encoder and a regressor, evaluate, and save artifacts.
    Train(TrainArgs),
    /// Predict the salary for one job described by flags.
    Predict(PredictArgs),
    /// Predict every row of a CSV.
    PredictBatch(BatchArgs),
    /// Show what a saved artifact directory contains.
    Inspect(ArtifactArgs),
}

/// Where the model / encoder / scaler JSON files live.
#[derive(Debug, Parser, Clone)]
pub struct ArtifactArgs {
    /// Artifact directory.
    #[arg(long, env = "SALARY_ARTIFACT_DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Training CSV (one row per salary observation).
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: PathBuf,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Pipeline variant. `standardized` also drops target outliers.
    #[arg(long, value_enum, default_value_t = PipelineVariant::Standardized)]
    pub variant: PipelineVariant,

    /// Which regressor to fit.
    #[arg(long, value_enum, default_value_t = ModelSpec::Linear)]
    pub model: ModelSpec,

    /// Number of trees (forest only).
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Maximum tree depth (forest only; unlimited by default).
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Minimum rows required to split a node (forest only).
    #[arg(long, default_value_t = 2)]
    pub min_samples_split: usize,

    /// Seed for the forest's bootstrap resampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Seed for the train/test shuffle.
    #[arg(long, default_value_t = 42)]
    pub split_seed: u64,

    /// Export hold-out `actual,predicted,residual` rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[arg(
        long,
        default_value_t = 2024,
        value_parser = clap::value_parser!(i32).range(i64::from(WORK_YEAR_MIN)..=i64::from(WORK_YEAR_MAX))
    )]
    pub work_year: i32,

    /// Remote work share in percent.
    #[arg(long, value_enum, default_value_t = RemoteRatio::Hybrid)]
    pub remote_ratio: RemoteRatio,

    #[arg(long, value_enum, default_value_t = ExperienceLevel::Se)]
    pub experience_level: ExperienceLevel,

    #[arg(long, value_enum, default_value_t = EmploymentType::Ft)]
    pub employment_type: EmploymentType,

    #[arg(long, value_enum, default_value_t = CompanySize::M)]
    pub company_size: CompanySize,

    #[arg(long, default_value = "US", value_parser = PossibleValuesParser::new(COUNTRY_CODES))]
    pub company_location: String,

    #[arg(long, default_value = "US", value_parser = PossibleValuesParser::new(COUNTRY_CODES))]
    pub employee_residence: String,

    #[arg(long, default_value = "Data Engineer", value_parser = PossibleValuesParser::new(JOB_TITLES))]
    pub job_title: String,
}

#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// CSV with the 8 input columns (extra columns are ignored).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Write `row,predicted_salary_usd` to this CSV.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

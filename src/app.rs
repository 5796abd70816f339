//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments into explicit per-command configuration
//! - runs the train / predict workflows
//! - prints reports

use clap::Parser;

use crate::cli::{BatchArgs, Command, PredictArgs, TrainArgs};
use crate::domain::{ForestParams, FormInput, PredictConfig, TrainConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `salary` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init()?;

    match cli.command {
        Command::Train(args) => handle_train(&args),
        Command::Predict(args) => handle_predict(&args),
        Command::PredictBatch(args) => handle_batch(&args),
        Command::Inspect(args) => {
            let bundle = crate::io::load_bundle(&args.artifacts)?;
            println!("{}", crate::report::format_bundle(&bundle));
            Ok(())
        }
    }
}

fn handle_train(args: &TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(args);
    let output = pipeline::run_train(&config)?;
    println!("{}", crate::report::format_train_summary(&output, &config));
    Ok(())
}

fn handle_predict(args: &PredictArgs) -> Result<(), AppError> {
    let config = PredictConfig {
        artifact_dir: args.artifacts.artifacts.clone(),
    };
    let input = form_input_from_args(args);
    let salary = pipeline::run_predict(&config, &input)?;
    println!("{}", crate::report::format_prediction(&input, salary));
    Ok(())
}

fn handle_batch(args: &BatchArgs) -> Result<(), AppError> {
    let config = PredictConfig {
        artifact_dir: args.artifacts.artifacts.clone(),
    };
    let batch = pipeline::run_batch(&config, &args.input, args.output.as_deref())?;

    if args.output.is_none() {
        for (row, value) in &batch.predictions {
            println!("{row}\t{}", crate::report::format_usd(*value));
        }
    }
    print!("{}", crate::report::format_batch_summary(&batch));
    Ok(())
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        csv_path: args.data.clone(),
        artifact_dir: args.artifacts.artifacts.clone(),
        variant: args.variant,
        model: args.model,
        forest: ForestParams {
            n_estimators: args.trees,
            max_depth: args.max_depth,
            min_samples_split: args.min_samples_split,
            seed: args.seed,
        },
        test_fraction: args.test_size,
        split_seed: args.split_seed,
        export_predictions: args.export.clone(),
    }
}

pub fn form_input_from_args(args: &PredictArgs) -> FormInput {
    FormInput {
        work_year: args.work_year,
        remote_ratio: args.remote_ratio,
        experience_level: args.experience_level,
        employment_type: args.employment_type,
        job_title: args.job_title.clone(),
        employee_residence: args.employee_residence.clone(),
        company_location: args.company_location.clone(),
        company_size: args.company_size,
    }
}

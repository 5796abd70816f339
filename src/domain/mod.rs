//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed column schema (`NumericColumn`, `CategoricalColumn`, `KEEP_COLUMNS`)
//! - the typed input record (`SalaryRecord`) and the form allow-lists
//! - the loosely-typed tabular container read from CSV (`Table`)
//! - request-scoped run configuration (`TrainConfig`, `PredictConfig`)

pub mod schema;
pub mod table;
pub mod types;

pub use schema::*;
pub use table::*;
pub use types::*;

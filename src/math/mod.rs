//! Numeric utilities: least squares and summary statistics.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;

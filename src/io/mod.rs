//! Input/output helpers.
//!
//! - CSV ingest into a raw table (`ingest`)
//! - model / encoder / scaler JSON artifacts (`artifacts`)
//! - evaluation and prediction CSV exports (`export`)

pub mod artifacts;
pub mod export;
pub mod ingest;

pub use artifacts::*;
pub use export::*;
pub use ingest::*;

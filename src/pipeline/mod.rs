//! The feature pipeline shared by training and inference.
//!
//! Training runs: raw `Table` -> [`clean`] -> [`split`] -> records -> [`fit_encode`].
//! Inference runs: record(s) -> [`apply_encode`] with the persisted vocabulary
//! and normalizer. Both paths produce the same column layout by construction,
//! because `fit_encode` is "fit, then apply".

pub mod clean;
pub mod encode;
pub mod split;

pub use clean::*;
pub use encode::*;
pub use split::*;

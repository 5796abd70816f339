//! `salary-predict` library crate.
//!
//! The binary (`salary`) is a thin wrapper around this library so that:
//!
//! - the feature pipeline is testable without spawning processes
//! - training and serving share exactly one encoding implementation
//! - modules stay easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod pipeline;
pub mod report;

//! Logging setup.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for the
//! command's actual output (reports, predictions) so it stays scriptable.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global subscriber. Defaults to `info`, overridable via `RUST_LOG`.
pub fn init() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| AppError::new(2, format!("Invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::new(2, format!("Failed to initialize logging: {e}")))?;

    Ok(())
}

//! Error types.
//!
//! Library code returns [`PipelineError`], a small typed taxonomy that callers
//! can match on. Only the outermost boundary (`app`) turns it into an
//! [`AppError`], which carries the process exit code.

/// Typed failures raised by the cleaning / encoding / prediction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A required column is missing or the column set is not the expected one.
    #[error("schema error: {0}")]
    Schema(String),

    /// A required value is null or cannot be read as the expected type.
    #[error("feature error: {0}")]
    Feature(String),

    /// A persisted artifact is missing, unreadable, or incompatible.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The regression model failed to produce a usable prediction.
    #[error("prediction error: {0}")]
    Prediction(String),
}

impl PipelineError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn feature(message: impl Into<String>) -> Self {
        Self::Feature(message.into())
    }

    pub fn artifact(message: impl Into<String>) -> Self {
        Self::Artifact(message.into())
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction(message.into())
    }

    /// Process exit code used when this error reaches `main`.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Schema(_) | PipelineError::Feature(_) => 2,
            PipelineError::Artifact(_) => 3,
            PipelineError::Prediction(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

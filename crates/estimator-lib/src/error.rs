//! Error taxonomy for artifact loading and prediction

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Classification of an artifact load failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactLoadKind {
    /// Directory or file missing or unreadable
    NotFound,
    /// Schema document failed to parse or validate
    MalformedSchema,
    /// Model blob failed to parse or validate
    MalformedModel,
}

impl ArtifactLoadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactLoadKind::NotFound => "not_found",
            ArtifactLoadKind::MalformedSchema => "malformed_schema",
            ArtifactLoadKind::MalformedModel => "malformed_model",
        }
    }
}

impl fmt::Display for ArtifactLoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to locate or deserialize the schema/model pair
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    /// None of the search paths exists
    #[error("no artifacts directory found, searched: {searched:?}")]
    DirectoryNotFound { searched: Vec<PathBuf> },

    /// The resolved directory lacks a file, or it could not be read
    #[error("artifact file {path:?} could not be read: {source}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema file is not a valid column document
    #[error("malformed schema {path:?}: {reason}")]
    MalformedSchema { path: PathBuf, reason: String },

    /// Model file is not a valid model blob
    #[error("malformed model {path:?}: {reason}")]
    MalformedModel { path: PathBuf, reason: String },
}

impl ArtifactLoadError {
    pub fn kind(&self) -> ArtifactLoadKind {
        match self {
            ArtifactLoadError::DirectoryNotFound { .. } | ArtifactLoadError::FileNotFound { .. } => {
                ArtifactLoadKind::NotFound
            }
            ArtifactLoadError::MalformedSchema { .. } => ArtifactLoadKind::MalformedSchema,
            ArtifactLoadError::MalformedModel { .. } => ArtifactLoadKind::MalformedModel,
        }
    }
}

/// Failure raised by a regression model itself
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Feature count differs from the fitted coefficients
    #[error("model expects {expected} inputs, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    /// Output is NaN or infinite
    #[error("model produced a non-finite output: {0}")]
    NonFinite(f64),

    #[error("{0}")]
    Other(String),
}

/// Machine-readable error kind reported at the inference boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request fields failed validation
    InvalidInput,
    /// Schema and model disagree on the vector width
    DimensionMismatch,
    /// The model raised an error or returned a non-number
    ModelInvocationFailed,
    /// No snapshot is available and recovery failed
    ServiceNotReady,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::DimensionMismatch => "dimension_mismatch",
            ErrorKind::ModelInvocationFailed => "model_invocation_failed",
            ErrorKind::ServiceNotReady => "service_not_ready",
        }
    }
}

/// Request-level prediction failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// Rejected before touching the model
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The snapshot's schema and model disagree on the vector width.
    #[error("feature vector has {actual} values but the model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The model call failed or produced an unusable value
    #[error("model invocation failed: {cause}")]
    ModelInvocationFailed {
        #[source]
        cause: ModelError,
    },

    /// No snapshot could be made ready for this request
    #[error("service temporarily unavailable: {0}")]
    ServiceNotReady(String),
}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::InvalidInput(_) => ErrorKind::InvalidInput,
            PredictionError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            PredictionError::ModelInvocationFailed { .. } => ErrorKind::ModelInvocationFailed,
            PredictionError::ServiceNotReady(_) => ErrorKind::ServiceNotReady,
        }
    }
}

/// Why a single load cycle attempt did not produce a publishable snapshot
#[derive(Debug, thiserror::Error)]
pub enum LoadFailure {
    #[error(transparent)]
    Artifact(#[from] ArtifactLoadError),

    /// Artifacts loaded but the sample prediction failed
    #[error("self-test failed: {0}")]
    SelfTest(String),

    #[error("load task aborted: {0}")]
    TaskAborted(String),
}

/// Outcome of a load cycle that exhausted its attempts
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("artifacts failed to load after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: LoadFailure },
}

//! Core library for the home price estimator
//!
//! This crate provides:
//! - Artifact discovery and loading (schema + regression model)
//! - Feature encoding and prediction
//! - Readiness lifecycle with retry and recovery
//! - Health reporting and observability

pub mod artifact;
pub mod error;
pub mod estimator;
pub mod health;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod predictor;

pub use artifact::{ArtifactConfig, ArtifactSnapshot, ArtifactSource, ArtifactStore, SnapshotInfo};
pub use error::{ArtifactLoadError, ErrorKind, LifecycleError, PredictionError};
pub use estimator::PriceEstimator;
pub use health::{HealthReporter, HealthStatus};
pub use lifecycle::{BackoffPolicy, BackoffStrategy, LifecycleConfig, LifecycleManager};
pub use models::*;
pub use observability::{EstimatorMetrics, StructuredLogger};

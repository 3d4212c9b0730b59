//! Persisted artifacts: feature schema, regression model and the snapshot
//! that bundles them

mod model;
mod schema;
mod snapshot;
mod store;

pub use model::{decode_model, LinearRegression, RegressionModel};
pub use schema::{normalize_location, Schema, SCHEMA_KEY};
pub use snapshot::{ArtifactSnapshot, SnapshotInfo};
pub use store::{
    default_search_paths, ArtifactConfig, ArtifactSource, ArtifactStore, DEFAULT_MODEL_FILE,
    DEFAULT_SCHEMA_FILE,
};

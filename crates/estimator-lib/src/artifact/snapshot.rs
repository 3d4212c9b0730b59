//! Immutable schema + model bundle

use super::model::RegressionModel;
use super::schema::Schema;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded schema/model pair. Never mutated after construction.
pub struct ArtifactSnapshot {
    schema: Schema,
    model: Arc<dyn RegressionModel>,
    created_at: DateTime<Utc>,
    fingerprint: String,
    source_dir: PathBuf,
}

impl ArtifactSnapshot {
    pub fn new(
        schema: Schema,
        model: Arc<dyn RegressionModel>,
        fingerprint: impl Into<String>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            schema,
            model,
            created_at: Utc::now(),
            fingerprint: fingerprint.into(),
            source_dir: source_dir.into(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn model(&self) -> &dyn RegressionModel {
        self.model.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Hex SHA-256 over the schema and model bytes
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            fingerprint: self.fingerprint.clone(),
            created_at: self.created_at,
            feature_count: self.schema.len(),
            model_width: self.model.input_width(),
            model_kind: self.model.kind().to_string(),
        }
    }
}

impl fmt::Debug for ArtifactSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactSnapshot")
            .field("fingerprint", &self.fingerprint)
            .field("features", &self.schema.len())
            .field("model_width", &self.model.input_width())
            .field("created_at", &self.created_at)
            .field("source_dir", &self.source_dir)
            .finish()
    }
}

/// Serializable summary of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInfo {
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub feature_count: usize,
    pub model_width: usize,
    pub model_kind: String,
}

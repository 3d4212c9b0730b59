//! Artifact store: locates, reads and validates the schema/model pair

use super::model::decode_model;
use super::schema::Schema;
use super::snapshot::ArtifactSnapshot;
use crate::error::ArtifactLoadError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default schema document file name
pub const DEFAULT_SCHEMA_FILE: &str = "columns.json";

/// Default model blob file name
pub const DEFAULT_MODEL_FILE: &str = "home_prices_model.json";

/// Where and under which names artifacts are stored
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Candidate directories, highest priority first
    pub search_paths: Vec<PathBuf>,
    pub schema_file: String,
    pub model_file: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            search_paths: default_search_paths(),
            schema_file: DEFAULT_SCHEMA_FILE.to_string(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
        }
    }
}

/// `./artifacts`, `<executable dir>/artifacts`, `../artifacts`
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("./artifacts")];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join("artifacts"));
    }
    paths.push(PathBuf::from("../artifacts"));
    paths
}

/// Anything that can produce a fresh snapshot
pub trait ArtifactSource: Send + Sync {
    fn load(&self) -> Result<ArtifactSnapshot, ArtifactLoadError>;
}

/// Filesystem-backed artifact store
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    config: ArtifactConfig,
}

impl ArtifactStore {
    pub fn new(config: ArtifactConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    /// Load from the first existing directory in `search_paths`
    pub fn load_from(&self, search_paths: &[PathBuf]) -> Result<ArtifactSnapshot, ArtifactLoadError> {
        let dir = resolve_directory(search_paths)?;
        info!(dir = %dir.display(), "Using artifacts directory");

        let schema_path = dir.join(&self.config.schema_file);
        let schema_bytes = read_file(&schema_path)?;
        let model_path = dir.join(&self.config.model_file);
        let model_bytes = read_file(&model_path)?;

        let schema = Schema::from_json(&schema_bytes).map_err(|reason| {
            ArtifactLoadError::MalformedSchema {
                path: schema_path.clone(),
                reason,
            }
        })?;
        debug!(
            columns = schema.len(),
            locations = schema.locations().len(),
            "Schema parsed"
        );

        let model = decode_model(&model_bytes).map_err(|reason| ArtifactLoadError::MalformedModel {
            path: model_path.clone(),
            reason,
        })?;
        debug!(kind = model.kind(), width = model.input_width(), "Model decoded");

        let fingerprint = compute_fingerprint(&schema_bytes, &model_bytes);
        Ok(ArtifactSnapshot::new(schema, model, fingerprint, dir))
    }
}

impl ArtifactSource for ArtifactStore {
    fn load(&self) -> Result<ArtifactSnapshot, ArtifactLoadError> {
        self.load_from(&self.config.search_paths)
    }
}

fn resolve_directory(search_paths: &[PathBuf]) -> Result<PathBuf, ArtifactLoadError> {
    let mut found = None;
    for path in search_paths {
        let exists = path.is_dir();
        debug!(path = %path.display(), found = exists, "Checking artifacts path");
        if exists && found.is_none() {
            found = Some(path.clone());
        }
    }

    found.ok_or_else(|| ArtifactLoadError::DirectoryNotFound {
        searched: search_paths.to_vec(),
    })
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactLoadError> {
    fs::read(path).map_err(|source| ArtifactLoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// SHA-256 of the schema bytes followed by the model bytes
fn compute_fingerprint(schema: &[u8], model: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(schema);
    hasher.update(model);
    hex::encode(hasher.finalize())
}

//! Feature schema: the ordered column layout the model was trained on

use crate::models::NUMERIC_FEATURES;
use serde::Deserialize;
use std::collections::HashMap;

/// Key of the column list inside the schema document
pub const SCHEMA_KEY: &str = "data_columns";

#[derive(Deserialize)]
struct SchemaDocument {
    data_columns: Vec<String>,
}

/// Ordered, immutable list of feature names
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
    location_index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema, enforcing length, uniqueness and location normalization
    pub fn new(columns: Vec<String>) -> Result<Self, String> {
        if columns.len() < NUMERIC_FEATURES {
            return Err(format!(
                "expected at least {} columns, found {}",
                NUMERIC_FEATURES,
                columns.len()
            ));
        }

        let mut seen = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if let Some(first) = seen.insert(name.as_str(), i) {
                return Err(format!(
                    "duplicate column {:?} at positions {} and {}",
                    name, first, i
                ));
            }
        }

        let mut location_index = HashMap::with_capacity(columns.len() - NUMERIC_FEATURES);
        for (i, name) in columns.iter().enumerate().skip(NUMERIC_FEATURES) {
            if name.is_empty() || normalize_location(name) != *name {
                return Err(format!(
                    "location column {:?} at position {} is not trimmed and lower-cased",
                    name, i
                ));
            }
            location_index.insert(name.clone(), i);
        }

        Ok(Self {
            columns,
            location_index,
        })
    }

    /// Parse the `{"data_columns": [...]}` document
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid JSON: {}", e))?;

        if value.get(SCHEMA_KEY).is_none() {
            return Err(format!("missing {:?} key", SCHEMA_KEY));
        }

        let document: SchemaDocument = serde_json::from_value(value)
            .map_err(|e| format!("{:?} must be a list of strings: {}", SCHEMA_KEY, e))?;
        Self::new(document.data_columns)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Location names, in schema order
    pub fn locations(&self) -> &[String] {
        &self.columns[NUMERIC_FEATURES..]
    }

    /// Vector slot for an already-normalized location name
    pub fn location_index(&self, normalized: &str) -> Option<usize> {
        self.location_index.get(normalized).copied()
    }
}

/// Trim and lower-case a location name for lookup
pub fn normalize_location(location: &str) -> String {
    location.trim().to_lowercase()
}

//! Core data models for the price estimator

use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fixed numeric slots at the head of every feature vector
pub const NUMERIC_FEATURES: usize = 3;

/// Slot holding the total floor area
pub const SLOT_TOTAL_SQFT: usize = 0;
/// Slot holding the bathroom count
pub const SLOT_BATH: usize = 1;
/// Slot holding the room (BHK) count
pub const SLOT_BHK: usize = 2;

/// A single price estimate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyQuery {
    pub location: String,
    #[serde(alias = "total_size")]
    pub total_sqft: f64,
    #[serde(alias = "room_count")]
    pub bhk: u32,
    #[serde(alias = "bath_count")]
    pub bath: u32,
}

impl PropertyQuery {
    pub fn new(location: impl Into<String>, total_sqft: f64, bhk: u32, bath: u32) -> Self {
        Self {
            location: location.into(),
            total_sqft,
            bhk,
            bath,
        }
    }

    /// Reject numeric inputs that would give the vector the wrong meaning
    pub fn validate(&self) -> Result<(), PredictionError> {
        if !self.total_sqft.is_finite() || self.total_sqft <= 0.0 {
            return Err(PredictionError::InvalidInput(format!(
                "total_sqft must be a positive finite number, got {}",
                self.total_sqft
            )));
        }
        if self.bhk == 0 {
            return Err(PredictionError::InvalidInput(
                "bhk must be a positive integer".to_string(),
            ));
        }
        if self.bath == 0 {
            return Err(PredictionError::InvalidInput(
                "bath must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Numeric model input aligned to a schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn set(&mut self, slot: usize, value: f64) {
        self.values[slot] = value;
    }

    /// Index of the one-hot location slot that is set, if any
    pub fn location_slot(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .skip(NUMERIC_FEATURES)
            .find(|(_, v)| **v == 1.0)
            .map(|(i, _)| i)
    }
}

/// A successful price estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub estimated_price: f64,
}

/// Readiness of the artifact lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessState {
    /// No load cycle has completed yet
    Uninitialized,
    /// A load cycle is running
    Loading,
    /// A verified snapshot is published
    Ready,
    /// The last cycle exhausted its attempts; nothing is served
    Degraded,
}

impl ReadinessState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessState::Ready)
    }

    /// Numeric encoding used by the readiness gauge
    pub fn as_gauge(&self) -> i64 {
        match self {
            ReadinessState::Uninitialized => 0,
            ReadinessState::Loading => 1,
            ReadinessState::Ready => 2,
            ReadinessState::Degraded => 3,
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadinessState::Uninitialized => "UNINITIALIZED",
            ReadinessState::Loading => "LOADING",
            ReadinessState::Ready => "READY",
            ReadinessState::Degraded => "DEGRADED",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validation_rejects_non_positive() {
        assert!(PropertyQuery::new("kalhalli", 1000.0, 2, 2).validate().is_ok());
        assert!(PropertyQuery::new("kalhalli", 0.0, 2, 2).validate().is_err());
        assert!(PropertyQuery::new("kalhalli", -5.0, 2, 2).validate().is_err());
        assert!(PropertyQuery::new("kalhalli", f64::NAN, 2, 2).validate().is_err());
        assert!(PropertyQuery::new("kalhalli", f64::INFINITY, 2, 2).validate().is_err());
        assert!(PropertyQuery::new("kalhalli", 1000.0, 0, 2).validate().is_err());
        assert!(PropertyQuery::new("kalhalli", 1000.0, 2, 0).validate().is_err());
    }

    #[test]
    fn test_query_accepts_boundary_aliases() {
        let query: PropertyQuery = serde_json::from_str(
            r#"{"location":"Kalhalli","total_size":1200.5,"room_count":3,"bath_count":2}"#,
        )
        .unwrap();
        assert_eq!(query, PropertyQuery::new("Kalhalli", 1200.5, 3, 2));
    }

    #[test]
    fn test_location_slot() {
        let vector = FeatureVector::from_values(vec![1000.0, 1.0, 1.0, 0.0, 1.0]);
        assert_eq!(vector.location_slot(), Some(4));

        let vector = FeatureVector::from_values(vec![1000.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(vector.location_slot(), None);
    }

    #[test]
    fn test_readiness_state_serialization() {
        let json = serde_json::to_string(&ReadinessState::Degraded).unwrap();
        assert_eq!(json, "\"DEGRADED\"");
        assert!(ReadinessState::Ready.is_ready());
        assert!(!ReadinessState::Loading.is_ready());
    }
}

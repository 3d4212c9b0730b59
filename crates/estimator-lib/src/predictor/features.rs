//! Feature encoding for ML inference
//!
//! Builds the model input from a property description. The first three slots
//! are numeric (size, bath, bhk, in that order); the rest are one-hot location
//! indicators taken from the schema.

use crate::artifact::{normalize_location, Schema};
use crate::models::{FeatureVector, PropertyQuery, SLOT_BATH, SLOT_BHK, SLOT_TOTAL_SQFT};
use tracing::{debug, warn};

/// Encode a property into a vector aligned to `schema`
///
/// Unknown locations leave every location slot at zero and produce an
/// estimate without a location adjustment.
pub fn encode(schema: &Schema, location: &str, total_sqft: f64, bhk: u32, bath: u32) -> FeatureVector {
    let mut vector = FeatureVector::zeros(schema.len());
    vector.set(SLOT_TOTAL_SQFT, total_sqft);
    vector.set(SLOT_BATH, bath as f64);
    vector.set(SLOT_BHK, bhk as f64);

    let normalized = normalize_location(location);
    match schema.location_index(&normalized) {
        Some(slot) => {
            vector.set(slot, 1.0);
            debug!(location = %normalized, slot, "Location encoded");
        }
        None => {
            warn!(location = %location, "Location not found in schema, predicting without location");
        }
    }

    vector
}

/// Encode a validated request
pub fn encode_query(schema: &Schema, query: &PropertyQuery) -> FeatureVector {
    encode(schema, &query.location, query.total_sqft, query.bhk, query.bath)
}

//! Prediction engine
//!
//! Runs the snapshot's regression model against an encoded vector after
//! checking that the vector width matches what the model was fitted on.

use super::output::round_price;
use crate::artifact::ArtifactSnapshot;
use crate::error::{ModelError, PredictionError};
use crate::models::{FeatureVector, PriceEstimate};
use std::time::Instant;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
const SLOW_INFERENCE_MS: u128 = 5;

/// Either a price estimate or a classified failure
pub type PredictionResult = Result<PriceEstimate, PredictionError>;

/// Run a single-sample prediction
pub fn predict(snapshot: &ArtifactSnapshot, vector: &FeatureVector) -> PredictionResult {
    let model = snapshot.model();
    let expected = model.input_width();
    if vector.len() != expected {
        return Err(PredictionError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }

    let start = Instant::now();
    let raw = model
        .predict(vector.as_slice())
        .map_err(|cause| PredictionError::ModelInvocationFailed { cause })?;

    let elapsed = start.elapsed();
    if elapsed.as_millis() > SLOW_INFERENCE_MS {
        warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", SLOW_INFERENCE_MS);
    } else {
        debug!(elapsed_us = elapsed.as_micros(), raw, "Inference completed");
    }

    let estimated_price = round_price(raw);
    if !estimated_price.is_finite() {
        return Err(PredictionError::ModelInvocationFailed {
            cause: ModelError::NonFinite(raw),
        });
    }
    Ok(PriceEstimate { estimated_price })
}

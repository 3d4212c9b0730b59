//! Request path: readiness gate, validation, encoding and prediction

use crate::error::PredictionError;
use crate::lifecycle::LifecycleManager;
use crate::models::PropertyQuery;
use crate::observability::{EstimatorMetrics, StructuredLogger};
use crate::predictor::{encode_query, predict, PredictionResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Serves price estimates against whatever snapshot is current
#[derive(Clone)]
pub struct PriceEstimator {
    lifecycle: Arc<LifecycleManager>,
    metrics: EstimatorMetrics,
    logger: StructuredLogger,
}

impl PriceEstimator {
    pub fn new(lifecycle: Arc<LifecycleManager>) -> Self {
        Self {
            lifecycle,
            metrics: EstimatorMetrics::new(),
            logger: StructuredLogger::new("price-estimator"),
        }
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle
    }

    /// Estimate a price. The snapshot is taken once and used for the whole call.
    pub async fn estimate(&self, query: &PropertyQuery) -> PredictionResult {
        let result = self.run(query).await;
        match &result {
            Ok(estimate) => {
                self.metrics.inc_predictions();
                self.logger.log_prediction(
                    &query.location,
                    query.total_sqft,
                    query.bhk,
                    query.bath,
                    estimate.estimated_price,
                );
            }
            Err(e) => {
                self.metrics.inc_prediction_errors(e.kind().as_str());
                debug!(error = %e, "Prediction failed");
            }
        }
        result
    }

    async fn run(&self, query: &PropertyQuery) -> PredictionResult {
        query.validate()?;
        let snapshot = self.lifecycle.ensure_ready().await?;

        let start = Instant::now();
        let vector = encode_query(snapshot.schema(), query);
        if vector.location_slot().is_none() {
            self.metrics.inc_unknown_locations();
        }

        let result = predict(&snapshot, &vector);
        self.metrics
            .observe_prediction_latency(start.elapsed().as_secs_f64());

        if let Err(e @ PredictionError::DimensionMismatch { .. }) = &result {
            error!(error = %e, fingerprint = %snapshot.fingerprint(), "Artifact pair is inconsistent");
            self.lifecycle.invalidate(&snapshot, &e.to_string());
        }
        result
    }

    /// Known location names of the serving snapshot
    pub async fn locations(&self) -> Result<Vec<String>, PredictionError> {
        let snapshot = self.lifecycle.ensure_ready().await?;
        Ok(snapshot.schema().locations().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{
        ArtifactSnapshot, ArtifactSource, LinearRegression, RegressionModel, Schema,
    };
    use crate::error::{ArtifactLoadError, ErrorKind, ModelError};
    use crate::lifecycle::{BackoffPolicy, LifecycleConfig, ManualClock};
    use crate::models::ReadinessState;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Five-column schema with a matching linear model; fails `failures` times first
    #[derive(Default)]
    struct TestSource {
        failures: AtomicU32,
    }

    impl ArtifactSource for TestSource {
        fn load(&self) -> Result<ArtifactSnapshot, ArtifactLoadError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(ArtifactLoadError::DirectoryNotFound { searched: vec![] });
            }
            let schema = Schema::new(
                ["total_sqft", "bath", "bhk", "1st phase jp nagar", "kalhalli"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
            .unwrap();
            let model = LinearRegression {
                n_features_in: 5,
                coef: vec![0.08, 5.0, 7.5, 12.0, -3.0],
                intercept: -10.0,
            };
            Ok(ArtifactSnapshot::new(schema, Arc::new(model), "test", "/tmp"))
        }
    }

    fn estimator(source: TestSource) -> PriceEstimator {
        let lifecycle = LifecycleManager::with_clock(
            Arc::new(source),
            LifecycleConfig {
                startup: BackoffPolicy::fixed(3, std::time::Duration::from_secs(2)),
                recovery: BackoffPolicy::once(),
            },
            Arc::new(ManualClock::default()),
        );
        PriceEstimator::new(Arc::new(lifecycle))
    }

    #[tokio::test]
    async fn test_estimate_known_location() {
        let estimator = estimator(TestSource::default());
        estimator.lifecycle().initialize().await.unwrap();
        // metrics are process-wide and tests run concurrently
        let before = estimator.metrics.predictions_total();

        let estimate = estimator
            .estimate(&PropertyQuery::new("1st Phase JP Nagar", 1000.0, 2, 2))
            .await
            .unwrap();
        // -10 + 80 + 10 + 15 + 12
        assert_eq!(estimate.estimated_price, 107.0);
        assert!(estimator.metrics.predictions_total() >= before + 1);
    }

    #[tokio::test]
    async fn test_estimate_unknown_location_degrades_gracefully() {
        let estimator = estimator(TestSource::default());
        estimator.lifecycle().initialize().await.unwrap();
        let before = estimator.metrics.unknown_locations();

        let estimate = estimator
            .estimate(&PropertyQuery::new("Ejipura", 1000.0, 2, 2))
            .await
            .unwrap();
        assert_eq!(estimate.estimated_price, 95.0);
        assert!(estimator.metrics.unknown_locations() >= before + 1);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_loading() {
        let estimator = estimator(TestSource::default());

        let err = estimator
            .estimate(&PropertyQuery::new("kalhalli", -1.0, 2, 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(estimator.lifecycle().state(), ReadinessState::Uninitialized);
    }

    #[tokio::test]
    async fn test_lazy_initialization_on_first_request() {
        let estimator = estimator(TestSource::default());

        let result = estimator
            .estimate(&PropertyQuery::new("kalhalli", 1000.0, 2, 2))
            .await;
        assert!(result.is_ok());
        assert_eq!(estimator.lifecycle().state(), ReadinessState::Ready);
    }

    #[tokio::test]
    async fn test_service_not_ready_when_recovery_fails() {
        let source = TestSource::default();
        source.failures.store(10, Ordering::SeqCst);
        let estimator = estimator(source);
        assert!(estimator.lifecycle().initialize().await.is_err());

        let err = estimator
            .estimate(&PropertyQuery::new("kalhalli", 1000.0, 2, 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceNotReady);
        assert!(estimator.locations().await.is_err());
    }

    /// Linear model whose declared width can be narrowed after publish
    #[derive(Default)]
    struct SwitchableModel {
        narrowed: AtomicBool,
    }

    impl RegressionModel for SwitchableModel {
        fn input_width(&self) -> usize {
            if self.narrowed.load(Ordering::SeqCst) {
                4
            } else {
                5
            }
        }

        fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
            Ok(features.iter().sum())
        }

        fn kind(&self) -> &'static str {
            "switchable"
        }
    }

    struct SwitchableSource {
        model: Arc<SwitchableModel>,
        loads: AtomicU32,
    }

    impl ArtifactSource for SwitchableSource {
        fn load(&self) -> Result<ArtifactSnapshot, ArtifactLoadError> {
            let generation = self.loads.fetch_add(1, Ordering::SeqCst);
            let schema = Schema::new(
                ["total_sqft", "bath", "bhk", "1st phase jp nagar", "kalhalli"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
            .unwrap();
            let model: Arc<dyn RegressionModel> = self.model.clone();
            Ok(ArtifactSnapshot::new(schema, model, format!("g{}", generation), "/tmp"))
        }
    }

    #[tokio::test]
    async fn test_dimension_mismatch_invalidates_snapshot() {
        let model = Arc::new(SwitchableModel::default());
        let source = Arc::new(SwitchableSource {
            model: model.clone(),
            loads: AtomicU32::new(0),
        });
        let lifecycle = Arc::new(LifecycleManager::with_clock(
            source.clone(),
            LifecycleConfig::default(),
            Arc::new(ManualClock::default()),
        ));
        let estimator = PriceEstimator::new(lifecycle.clone());
        lifecycle.initialize().await.unwrap();

        model.narrowed.store(true, Ordering::SeqCst);
        let query = PropertyQuery::new("kalhalli", 1000.0, 2, 2);
        let err = estimator.estimate(&query).await.unwrap_err();
        assert_eq!(err, PredictionError::DimensionMismatch { expected: 4, actual: 5 });
        assert_eq!(lifecycle.state(), ReadinessState::Degraded);
        assert!(lifecycle.serving_snapshot().is_none());

        // the next request reloads
        model.narrowed.store(false, Ordering::SeqCst);
        let estimate = estimator.estimate(&query).await.unwrap();
        assert_eq!(estimate.estimated_price, 1005.0);
        assert_eq!(lifecycle.state(), ReadinessState::Ready);
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_locations_listing() {
        let estimator = estimator(TestSource::default());
        estimator.lifecycle().initialize().await.unwrap();

        let locations = estimator.locations().await.unwrap();
        assert_eq!(locations, vec!["1st phase jp nagar", "kalhalli"]);
    }
}

//! Health reporting for the price estimator
//!
//! Derives readiness entirely from lifecycle state; never triggers a load.

use crate::artifact::SnapshotInfo;
use crate::lifecycle::LifecycleManager;
use crate::models::ReadinessState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Health boundary response
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub state: ReadinessState,
    pub ready: bool,
    pub last_transition: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Read-only view over a lifecycle manager
#[derive(Clone)]
pub struct HealthReporter {
    lifecycle: Arc<LifecycleManager>,
}

impl HealthReporter {
    pub fn new(lifecycle: Arc<LifecycleManager>) -> Self {
        Self { lifecycle }
    }

    pub fn status(&self) -> HealthStatus {
        let status = self.lifecycle.status();
        HealthStatus {
            state: status.state,
            ready: status.state.is_ready(),
            last_transition: status.last_transition,
            snapshot: status.snapshot.as_ref().map(|s| s.info()),
            last_error: status.last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactSnapshot, ArtifactSource, LinearRegression, Schema};
    use crate::error::ArtifactLoadError;
    use crate::lifecycle::{BackoffPolicy, LifecycleConfig, ManualClock};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingSource {
        loads: AtomicU32,
        healthy: bool,
    }

    impl ArtifactSource for CountingSource {
        fn load(&self) -> Result<ArtifactSnapshot, ArtifactLoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if !self.healthy {
                return Err(ArtifactLoadError::DirectoryNotFound { searched: vec![] });
            }
            let schema = Schema::new(
                ["total_sqft", "bath", "bhk", "kalhalli"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
            .unwrap();
            let model = LinearRegression {
                n_features_in: 4,
                coef: vec![1.0; 4],
                intercept: 0.0,
            };
            Ok(ArtifactSnapshot::new(schema, Arc::new(model), "abc123", "/tmp"))
        }
    }

    fn setup(healthy: bool) -> (HealthReporter, Arc<LifecycleManager>, Arc<CountingSource>) {
        let source = Arc::new(CountingSource {
            loads: AtomicU32::new(0),
            healthy,
        });
        let config = LifecycleConfig {
            startup: BackoffPolicy::fixed(3, std::time::Duration::from_secs(2)),
            recovery: BackoffPolicy::once(),
        };
        let lifecycle = Arc::new(LifecycleManager::with_clock(
            source.clone(),
            config,
            Arc::new(ManualClock::default()),
        ));
        (HealthReporter::new(lifecycle.clone()), lifecycle, source)
    }

    #[tokio::test]
    async fn test_status_not_ready_initially() {
        let (reporter, _lifecycle, source) = setup(true);
        let status = reporter.status();

        assert_eq!(status.state, ReadinessState::Uninitialized);
        assert!(!status.ready);
        assert!(status.snapshot.is_none());
        // reading health never loads
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_ready_after_initialize() {
        let (reporter, lifecycle, _source) = setup(true);
        lifecycle.initialize().await.unwrap();

        let status = reporter.status();
        assert_eq!(status.state, ReadinessState::Ready);
        assert!(status.ready);
        let snapshot = status.snapshot.unwrap();
        assert_eq!(snapshot.fingerprint, "abc123");
        assert_eq!(snapshot.feature_count, 4);
        assert_eq!(snapshot.model_width, 4);
    }

    #[tokio::test]
    async fn test_status_degraded_after_failures() {
        let (reporter, lifecycle, source) = setup(false);
        assert!(lifecycle.initialize().await.is_err());

        let status = reporter.status();
        assert_eq!(status.state, ReadinessState::Degraded);
        assert!(!status.ready);
        assert!(status.last_error.is_some());

        let loads = source.loads.load(Ordering::SeqCst);
        reporter.status();
        assert_eq!(source.loads.load(Ordering::SeqCst), loads);
    }

    #[tokio::test]
    async fn test_status_serialization() {
        let (reporter, lifecycle, _source) = setup(true);
        lifecycle.initialize().await.unwrap();

        let json = serde_json::to_value(reporter.status()).unwrap();
        assert_eq!(json["state"], "READY");
        assert_eq!(json["ready"], true);
        assert!(json["last_transition"].is_string());
        assert_eq!(json["snapshot"]["fingerprint"], "abc123");
        assert!(json.get("last_error").is_none());
    }
}

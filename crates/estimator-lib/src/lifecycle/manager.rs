//! Artifact lifecycle: load, verify, publish with bounded retry
//!
//! The manager owns the single current snapshot. Load cycles build a
//! candidate off the request path, run a self-test prediction against it and
//! only then swap it in. Readers clone the `Arc` once per request.

use super::backoff::BackoffPolicy;
use super::clock::{Clock, SystemClock};
use crate::artifact::{ArtifactSnapshot, ArtifactSource};
use crate::error::{LifecycleError, LoadFailure, PredictionError};
use crate::models::{PriceEstimate, ReadinessState};
use crate::observability::{EstimatorMetrics, StructuredLogger};
use crate::predictor::{encode, predict};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Self-test input: size, bhk, bath
const SELF_TEST_SQFT: f64 = 1000.0;
const SELF_TEST_BHK: u32 = 2;
const SELF_TEST_BATH: u32 = 2;

/// Retry policies for startup and lazy recovery
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Policy for `initialize` and `reload`
    pub startup: BackoffPolicy,
    /// Policy for the synchronous recovery attempt in `ensure_ready`
    pub recovery: BackoffPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            startup: BackoffPolicy::default(),
            recovery: BackoffPolicy::once(),
        }
    }
}

/// Point-in-time copy of lifecycle state
#[derive(Debug, Clone)]
pub struct LifecycleStatus {
    pub state: ReadinessState,
    pub last_transition: DateTime<Utc>,
    pub snapshot: Option<Arc<ArtifactSnapshot>>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct Published {
    state: ReadinessState,
    snapshot: Option<Arc<ArtifactSnapshot>>,
    last_transition: DateTime<Utc>,
    last_error: Option<String>,
}

pub struct LifecycleManager {
    source: Arc<dyn ArtifactSource>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
    published: RwLock<Published>,
    in_flight: Mutex<()>,
    completed_cycles: AtomicU64,
    metrics: EstimatorMetrics,
    logger: StructuredLogger,
}

impl LifecycleManager {
    pub fn new(source: Arc<dyn ArtifactSource>, config: LifecycleConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn ArtifactSource>,
        config: LifecycleConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let published = Published {
            state: ReadinessState::Uninitialized,
            snapshot: None,
            last_transition: clock.now(),
            last_error: None,
        };
        let metrics = EstimatorMetrics::new();
        metrics.set_readiness(ReadinessState::Uninitialized);

        Self {
            source,
            clock,
            config,
            published: RwLock::new(published),
            in_flight: Mutex::new(()),
            completed_cycles: AtomicU64::new(0),
            metrics,
            logger: StructuredLogger::new("price-estimator"),
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn state(&self) -> ReadinessState {
        self.read().state
    }

    pub fn status(&self) -> LifecycleStatus {
        let published = self.read();
        LifecycleStatus {
            state: published.state,
            last_transition: published.last_transition,
            snapshot: published.snapshot.clone(),
            last_error: published.last_error.clone(),
        }
    }

    /// The snapshot requests may use right now, if any.
    ///
    /// A snapshot keeps serving while a reload is in progress; a degraded
    /// manager serves nothing.
    pub fn serving_snapshot(&self) -> Option<Arc<ArtifactSnapshot>> {
        let published = self.read();
        match published.state {
            ReadinessState::Degraded => None,
            _ => published.snapshot.clone(),
        }
    }

    /// Load, verify and publish using the startup policy.
    ///
    /// On exhaustion the manager is left `Degraded` and the last failure is
    /// returned; the caller keeps running.
    pub async fn initialize(&self) -> Result<Arc<ArtifactSnapshot>, LifecycleError> {
        let _guard = self.in_flight.lock().await;
        let policy = self.config.startup.clone();
        self.run_cycle(&policy).await
    }

    /// Explicit reload, also the way out of `Degraded`
    pub async fn reload(&self) -> Result<Arc<ArtifactSnapshot>, LifecycleError> {
        info!("Explicit artifact reload requested");
        self.initialize().await
    }

    /// Gate for the request path.
    ///
    /// Returns the serving snapshot, or makes one synchronous recovery attempt
    /// when none is available. Callers that queued behind another recovery
    /// attempt take its outcome instead of starting their own.
    pub async fn ensure_ready(&self) -> Result<Arc<ArtifactSnapshot>, PredictionError> {
        if let Some(snapshot) = self.serving_snapshot() {
            return Ok(snapshot);
        }

        let observed_cycles = self.completed_cycles.load(Ordering::SeqCst);
        let _guard = self.in_flight.lock().await;

        if let Some(snapshot) = self.serving_snapshot() {
            return Ok(snapshot);
        }
        if self.completed_cycles.load(Ordering::SeqCst) != observed_cycles {
            let reason = self
                .read()
                .last_error
                .clone()
                .unwrap_or_else(|| "artifacts not loaded".to_string());
            return Err(PredictionError::ServiceNotReady(reason));
        }

        warn!(state = %self.state(), "No snapshot available, attempting to reload artifacts");
        let policy = self.config.recovery.clone();
        self.run_cycle(&policy)
            .await
            .map_err(|e| PredictionError::ServiceNotReady(e.to_string()))
    }

    /// Discard `snapshot` if it is still current; the next request reloads.
    ///
    /// Called when a prediction against it reports a dimension mismatch.
    pub fn invalidate(&self, snapshot: &Arc<ArtifactSnapshot>, reason: &str) {
        let now = self.clock.now();
        let discarded = {
            let mut published = self.write();
            let is_current = published
                .snapshot
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, snapshot));
            if is_current {
                published.state = ReadinessState::Degraded;
                published.last_transition = now;
                published.last_error = Some(reason.to_string());
                published.snapshot.take()
            } else {
                None
            }
        };

        if discarded.is_some() {
            error!(
                fingerprint = %snapshot.fingerprint(),
                reason = %reason,
                "Snapshot invalidated, reload required"
            );
            self.metrics.set_readiness(ReadinessState::Degraded);
            self.metrics.set_snapshot(None);
            self.logger.log_degraded(reason);
        } else {
            debug!(fingerprint = %snapshot.fingerprint(), "Stale snapshot already replaced");
        }
    }

    async fn run_cycle(&self, policy: &BackoffPolicy) -> Result<Arc<ArtifactSnapshot>, LifecycleError> {
        let attempts = policy.attempts();
        let mut attempt = 1;

        let outcome = loop {
            self.transition(ReadinessState::Loading, None);
            info!(attempt, max_attempts = attempts, "Loading artifacts");
            self.metrics.inc_load_attempts();

            match self.load_and_verify().await {
                Ok(snapshot) => {
                    let snapshot = Arc::new(snapshot);
                    self.publish(Arc::clone(&snapshot));
                    break Ok(snapshot);
                }
                Err(failure) => {
                    error!(attempt, max_attempts = attempts, error = %failure, "Artifact load attempt failed");
                    self.metrics.inc_load_failures(failure_reason(&failure));

                    if attempt >= attempts {
                        self.degrade(&failure.to_string());
                        break Err(LifecycleError::Exhausted {
                            attempts,
                            last: failure,
                        });
                    }

                    self.transition(ReadinessState::Uninitialized, Some(failure.to_string()));
                    let delay = policy.delay_after(attempt);
                    info!(delay_ms = delay.as_millis() as u64, "Retrying artifact load");
                    self.clock.sleep(delay).await;
                    attempt += 1;
                }
            }
        };

        self.completed_cycles.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn load_and_verify(&self) -> Result<ArtifactSnapshot, LoadFailure> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || -> Result<ArtifactSnapshot, LoadFailure> {
            let snapshot = source.load()?;
            let estimate = self_test(&snapshot)?;
            debug!(estimated_price = estimate.estimated_price, "Self-test passed");
            Ok(snapshot)
        })
        .await
        .map_err(|e| LoadFailure::TaskAborted(e.to_string()))?
    }

    fn publish(&self, snapshot: Arc<ArtifactSnapshot>) {
        let now = self.clock.now();
        let previous = {
            let mut published = self.write();
            let previous = published.snapshot.replace(Arc::clone(&snapshot));
            published.state = ReadinessState::Ready;
            published.last_transition = now;
            published.last_error = None;
            previous
        };

        if let Some(previous) = previous {
            debug!(fingerprint = %previous.fingerprint(), "Previous snapshot discarded");
        }
        self.metrics.set_readiness(ReadinessState::Ready);
        self.metrics.set_snapshot(Some(&snapshot));
        self.logger.log_snapshot_published(&snapshot);
    }

    /// Enter `Degraded` and drop the published snapshot in the same critical section
    fn degrade(&self, reason: &str) {
        let now = self.clock.now();
        let discarded = {
            let mut published = self.write();
            if published.state != ReadinessState::Degraded {
                published.state = ReadinessState::Degraded;
                published.last_transition = now;
            }
            published.last_error = Some(reason.to_string());
            published.snapshot.take()
        };

        if let Some(previous) = discarded {
            debug!(fingerprint = %previous.fingerprint(), "Previous snapshot discarded");
        }
        self.metrics.set_readiness(ReadinessState::Degraded);
        self.metrics.set_snapshot(None);
        self.logger.log_degraded(reason);
    }

    fn transition(&self, state: ReadinessState, error: Option<String>) {
        let now = self.clock.now();
        {
            let mut published = self.write();
            if published.state != state {
                published.state = state;
                published.last_transition = now;
            }
            if error.is_some() {
                published.last_error = error;
            }
        }
        self.metrics.set_readiness(state);
    }

    fn read(&self) -> RwLockReadGuard<'_, Published> {
        self.published.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Published> {
        self.published.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Predict the first schema location at a fixed size and require a number
pub fn self_test(snapshot: &ArtifactSnapshot) -> Result<PriceEstimate, LoadFailure> {
    let schema = snapshot.schema();
    let location = schema
        .locations()
        .first()
        .ok_or_else(|| LoadFailure::SelfTest("schema has no locations".to_string()))?;

    let vector = encode(schema, location, SELF_TEST_SQFT, SELF_TEST_BHK, SELF_TEST_BATH);
    let estimate = predict(snapshot, &vector).map_err(|e| LoadFailure::SelfTest(e.to_string()))?;

    if !estimate.estimated_price.is_finite() {
        return Err(LoadFailure::SelfTest(format!(
            "non-finite estimate {}",
            estimate.estimated_price
        )));
    }
    Ok(estimate)
}

fn failure_reason(failure: &LoadFailure) -> &'static str {
    match failure {
        LoadFailure::Artifact(e) => e.kind().as_str(),
        LoadFailure::SelfTest(_) => "self_test",
        LoadFailure::TaskAborted(_) => "task_aborted",
    }
}

//! Artifact lifecycle management

mod backoff;
mod clock;
mod manager;

pub use backoff::{BackoffPolicy, BackoffStrategy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{self_test, LifecycleConfig, LifecycleManager, LifecycleStatus};

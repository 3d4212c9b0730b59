//! Retry policy for artifact load cycles

use std::time::Duration;

/// How the delay between attempts evolves
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    Fixed(Duration),
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Duration,
    },
}

/// Attempt bound plus delay function
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub strategy: BackoffStrategy,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            strategy: BackoffStrategy::Fixed(Duration::from_secs(2)),
        }
    }
}

impl BackoffPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            strategy: BackoffStrategy::Fixed(delay),
        }
    }

    pub fn exponential(max_attempts: u32, initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            max_attempts,
            strategy: BackoffStrategy::Exponential {
                initial,
                multiplier,
                max,
            },
        }
    }

    /// A single attempt with no delay
    pub fn once() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Attempts actually run; a zero bound still runs once
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match &self.strategy {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = initial.as_secs_f64() * multiplier.max(1.0).powi(exponent);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        }
    }
}

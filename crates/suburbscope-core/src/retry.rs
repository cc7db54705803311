//! Resolver-side retry of unavailable live calls.
//!
//! The live client never retries on its own; the resolver consults this
//! policy before giving up on the live path and falling back.

use std::time::Duration;

use crate::data_source::SourceError;

/// Delay between live attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let seconds = base.as_secs_f64() * factor.powi(attempt as i32);
                let capped = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));
                if !jitter {
                    return capped;
                }

                let capped_ms = capped.as_millis() as u64;
                let spread = capped_ms / 2;
                let offset = fastrand::u64(0..=spread * 2);
                Duration::from_millis((capped_ms + offset).saturating_sub(spread))
            }
        }
    }
}

/// How many times an unavailable live call is retried before fallback.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetryConfig {
    /// Total live attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self::default()
    }

    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::default(),
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// Whether the failure of 0-based `attempt` earns another live attempt.
    /// Only transient unavailability is retried.
    pub fn should_retry(&self, error: &SourceError, attempt: u32) -> bool {
        error.retryable() && attempt < self.max_retries
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

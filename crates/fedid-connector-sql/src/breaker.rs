//! Dead-connection circuit breaker.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Fail-fast guard around an unreliable data source.
///
/// After a query execution failure the breaker records a "dead since"
/// timestamp; until the retry interval elapses every caller is refused
/// without touching the source. Once the interval passes, one attempt is
/// allowed through - its outcome either resets the breaker or re-arms it.
#[derive(Debug)]
pub struct CircuitBreaker {
    retry_interval: Duration,
    dead_since: Mutex<Option<Instant>>,
}

impl CircuitBreaker {
    /// Creates a closed breaker with the given retry interval.
    #[must_use]
    pub fn new(retry_interval: Duration) -> Self {
        Self {
            retry_interval,
            dead_since: Mutex::new(None),
        }
    }

    /// Returns the configured retry interval.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Checks whether an attempt is allowed at `now`.
    ///
    /// Returns `Err(remaining)` while the source is considered dead.
    pub fn check_at(&self, now: Instant) -> Result<(), Duration> {
        let guard = self.dead_since.lock();
        match *guard {
            Some(dead_since) => {
                let elapsed = now.saturating_duration_since(dead_since);
                if elapsed < self.retry_interval {
                    Err(self.retry_interval - elapsed)
                } else {
                    // Interval elapsed: let one probe through. The flag
                    // stays set until the probe succeeds and resets it.
                    Ok(())
                }
            }
            None => Ok(()),
        }
    }

    /// Checks whether an attempt is allowed now.
    pub fn check(&self) -> Result<(), Duration> {
        self.check_at(Instant::now())
    }

    /// Marks the source dead as of `now`.
    pub fn trip_at(&self, now: Instant) {
        *self.dead_since.lock() = Some(now);
    }

    /// Marks the source dead as of now.
    pub fn trip(&self) {
        self.trip_at(Instant::now());
    }

    /// Marks the source healthy again.
    pub fn reset(&self) {
        *self.dead_since.lock() = None;
    }

    /// Returns whether the breaker currently refuses attempts at `now`.
    #[must_use]
    pub fn is_open_at(&self, now: Instant) -> bool {
        self.check_at(now).is_err()
    }
}

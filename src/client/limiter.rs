//! Minimum-spacing rate limiter
//!
//! A [`RateLimiter`] lets one caller through per interval. Concurrent callers queue
//! on an async mutex, so acquisitions are served in order and are never closer
//! together than the configured interval.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Upper bound on an interval built from an untrusted delay such as robots.txt `Crawl-delay`
pub const MAX_DELAY: Duration = Duration::from_secs(3600);

/// Enforces a minimum interval between successive acquisitions
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,

    /// Time of the last acquisition. `None` until the first caller goes through.
    last_acquired: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing one acquisition per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_acquired: Mutex::new(None),
        }
    }

    /// Creates a limiter from a delay expressed in (possibly fractional) seconds
    ///
    /// Negative or NaN delays are treated as zero. Delays above [`MAX_DELAY`],
    /// infinity included, are capped at it.
    pub fn from_secs_f64(delay: f64) -> Self {
        let interval = if delay.is_nan() || delay <= 0.0 {
            Duration::ZERO
        } else {
            match Duration::try_from_secs_f64(delay) {
                Ok(interval) if interval <= MAX_DELAY => interval,
                _ => {
                    tracing::warn!(
                        "Delay of {}s exceeds maximum, capping at {}s",
                        delay,
                        MAX_DELAY.as_secs()
                    );
                    MAX_DELAY
                }
            }
        };
        Self::new(interval)
    }

    /// The minimum interval between two acquisitions
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the interval since the previous acquisition has elapsed
    ///
    /// The first acquisition is immediate.
    pub async fn acquire(&self) {
        let mut last = self.last_acquired.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::trace!("Rate limiter waiting {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

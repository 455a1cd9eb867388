use governor::{
    Quota,
    clock::Clock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThrottleError {
    #[error("Invalid rate: {0} requests per second")]
    InvalidRate(f64),

    #[error("Rate limit would exceed the deadline")]
    DeadlineExceeded,

    #[error("Cancelled while waiting for the rate limiter")]
    Cancelled,
}

/// Governor clock reading tokio time, so admissions and sleeps share one
/// time source (and follow a paused runtime in tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        Instant::now().into_std()
    }
}

type DirectLimiter =
    governor::RateLimiter<NotKeyed, InMemoryState, TokioClock, NoOpMiddleware<std::time::Instant>>;

/// Token bucket with a burst of one: at most one admission per interval.
///
/// Callers block until admitted. Create one per process and share it with
/// every component issuing upstream requests. A caller that gives up
/// (deadline, cancellation) never holds a slot.
pub struct RateLimiter {
    interval: Duration,
    limiter: DirectLimiter,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Result<Self, ThrottleError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(ThrottleError::InvalidRate(requests_per_second));
        }
        let interval = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .map_err(|_| ThrottleError::InvalidRate(requests_per_second))?;
        let quota =
            Quota::with_period(interval).ok_or(ThrottleError::InvalidRate(requests_per_second))?;
        Ok(Self::from_quota(interval, quota))
    }

    /// A zero interval admits every caller right away.
    pub fn with_interval(interval: Duration) -> Self {
        let quota = Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX));
        Self::from_quota(interval, quota)
    }

    fn from_quota(interval: Duration, quota: Quota) -> Self {
        Self {
            interval,
            limiter: governor::RateLimiter::direct_with_clock(
                quota.allow_burst(NonZeroU32::MIN),
                TokioClock,
            ),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes a slot if one is free now, else returns how long until the next one.
    fn try_admit(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(TokioClock.now()))
    }

    pub async fn wait(&self) {
        while let Err(wait) = self.try_admit() {
            sleep(wait).await;
        }
    }

    /// Fails right away, without taking a slot, if admission would come after `deadline`.
    pub async fn wait_until(&self, deadline: Instant) -> Result<(), ThrottleError> {
        while let Err(wait) = self.try_admit() {
            if Instant::now() + wait > deadline {
                return Err(ThrottleError::DeadlineExceeded);
            }
            sleep(wait).await;
        }
        Ok(())
    }

    pub async fn wait_or_cancel(&self, cancel: &CancellationToken) -> Result<(), ThrottleError> {
        if cancel.is_cancelled() {
            return Err(ThrottleError::Cancelled);
        }
        while let Err(wait) = self.try_admit() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ThrottleError::Cancelled),
                _ = sleep(wait) => {}
            }
        }
        Ok(())
    }
}

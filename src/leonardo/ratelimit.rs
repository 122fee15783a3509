//! Client-wide outbound call serialization.
//!
//! A single permit exists per client. Acquiring it waits for the previous
//! holder to release and then for the configured spacing to elapse since that
//! release. The backend throttles per session, not per endpoint, so every call
//! of the client goes through the same limiter.

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, OwnedMutexGuard},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use crate::error::LeonardoError;

pub const DEFAULT_SPACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RateLimiter {
    spacing: Duration,
    last_release: Arc<Mutex<Option<Instant>>>,
}

/// Held for the duration of one outbound call. Dropping it records the
/// release time, on every exit path.
#[derive(Debug)]
pub struct RatePermit {
    guard: OwnedMutexGuard<Option<Instant>>,
}

impl Drop for RatePermit {
    fn drop(&mut self) {
        *self.guard = Some(Instant::now());
    }
}

impl RateLimiter {
    /// A zero `spacing` falls back to [`DEFAULT_SPACING`].
    pub fn new(spacing: Duration) -> Self {
        let spacing = if spacing.is_zero() {
            DEFAULT_SPACING
        } else {
            spacing
        };
        Self {
            spacing,
            last_release: Arc::new(Mutex::new(None)),
        }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<RatePermit, LeonardoError> {
        let guard = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(LeonardoError::Cancelled),
            guard = self.last_release.clone().lock_owned() => guard,
        };

        if let Some(released) = *guard {
            let ready = released + self.spacing;
            tokio::select! {
                biased;
                // Dropping the guard here leaves the previous release time untouched.
                () = cancel.cancelled() => return Err(LeonardoError::Cancelled),
                () = tokio::time::sleep_until(ready) => {}
            }
        }

        Ok(RatePermit { guard })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SPACING)
    }
}

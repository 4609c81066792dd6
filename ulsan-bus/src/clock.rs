//! Time sources.
//!
//! Sensors need two clocks: local wall time for live windows and sync
//! timestamps, and a monotonic clock for throttling. Both come from a
//! [`Clock`] so tests can drive them by hand.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn local_now(&self) -> NaiveDateTime;

    /// Current monotonic time.
    fn monotonic_now(&self) -> Instant;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn monotonic_now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    state: Mutex<(NaiveDateTime, Duration)>,
}

impl ManualClock {
    /// Create a clock reading `local` with no elapsed monotonic time.
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new((local, Duration::ZERO)),
        }
    }

    /// Move both clocks forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Ok(delta) = chrono::Duration::from_std(by) {
            state.0 += delta;
        }
        state.1 += by;
    }

    /// Jump the wall clock without touching the monotonic clock.
    pub fn set_local(&self, local: NaiveDateTime) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.0 = local;
    }
}

impl Clock for ManualClock {
    fn local_now(&self) -> NaiveDateTime {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).0
    }

    fn monotonic_now(&self) -> Instant {
        let elapsed = self.state.lock().unwrap_or_else(PoisonError::into_inner).1;
        self.origin + elapsed
    }
}

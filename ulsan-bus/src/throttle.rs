//! Minimum-interval gate for refreshes.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Allows an operation at most once per `interval`.
///
/// The check and the update of the last-acquired time happen under one lock,
/// so two concurrent callers can never both pass inside the same window.
/// The first call always passes.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Create a throttle with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Try to pass the gate at `now`.
    ///
    /// Returns `true` (and records `now`) if the window has elapsed.
    pub async fn try_acquire(&self, now: Instant) -> bool {
        let mut last = self.last.lock().await;

        let open = match *last {
            None => true,
            Some(prev) => now.saturating_duration_since(prev) >= self.interval,
        };

        if open {
            *last = Some(now);
        }

        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_passes() {
        let throttle = Throttle::new(Duration::from_secs(120));
        assert!(throttle.try_acquire(Instant::now()).await);
    }

    #[tokio::test]
    async fn blocks_inside_window() {
        let throttle = Throttle::new(Duration::from_secs(120));
        let t0 = Instant::now();

        assert!(throttle.try_acquire(t0).await);
        assert!(!throttle.try_acquire(t0 + Duration::from_secs(1)).await);
        assert!(!throttle.try_acquire(t0 + Duration::from_secs(119)).await);
        assert!(throttle.try_acquire(t0 + Duration::from_secs(120)).await);
    }

    #[tokio::test]
    async fn window_restarts_from_last_pass() {
        let throttle = Throttle::new(Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(throttle.try_acquire(t0).await);
        assert!(throttle.try_acquire(t0 + Duration::from_secs(15)).await);
        // 20s is only 5s after the last pass
        assert!(!throttle.try_acquire(t0 + Duration::from_secs(20)).await);
    }

    #[tokio::test]
    async fn concurrent_callers_pass_once() {
        let throttle = std::sync::Arc::new(Throttle::new(Duration::from_secs(120)));
        let now = Instant::now();

        let attempts = (0..8).map(|_| {
            let throttle = throttle.clone();
            tokio::spawn(async move { throttle.try_acquire(now).await })
        });

        let passed = futures::future::join_all(attempts)
            .await
            .into_iter()
            .filter(|r| *r.as_ref().unwrap())
            .count();

        assert_eq!(passed, 1);
    }
}

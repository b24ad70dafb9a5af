//! Sleepers for deterministic retry tests

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::resilience::Sleeper;

/// Records every requested wait and returns immediately
#[derive(Debug, Default)]
pub struct TrackingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl TrackingSleeper {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far, in order.
    #[must_use]
    pub fn recorded(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }

    /// Sum of all requested waits.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.waits.lock().iter().sum()
    }

    /// Forget recorded waits.
    pub fn clear(&self) {
        self.waits.lock().clear();
    }
}

#[async_trait]
impl Sleeper for TrackingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Returns immediately without recording anything
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Never completes; only cancellation can end a wait on it
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingSleeper;

#[async_trait]
impl Sleeper for PendingSleeper {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracking_sleeper_records_in_order() {
        let sleeper = TrackingSleeper::new();
        sleeper.sleep(Duration::from_millis(3)).await;
        sleeper.sleep(Duration::ZERO).await;

        assert_eq!(sleeper.recorded(), vec![Duration::from_millis(3), Duration::ZERO]);
        assert_eq!(sleeper.total(), Duration::from_millis(3));

        sleeper.clear();
        assert!(sleeper.recorded().is_empty());
    }
}

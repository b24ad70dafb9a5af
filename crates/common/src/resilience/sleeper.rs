//! Pluggable backoff waits
//!
//! The retry loop never calls `tokio::time::sleep` directly. Tests swap in a
//! sleeper that records the requested waits and returns immediately.

use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            // A zero wait still gives other tasks a turn before retrying.
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(duration).await;
        }
    }
}

//! Shareable invocation counter

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Counts calls across clones and tasks
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicU32>,
}

impl CallCounter {
    /// Create a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call and return the 1-based number of this call.
    pub fn hit(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn get(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

//! Logical clock collaborator supplying the current height

use std::sync::atomic::{AtomicU64, Ordering};

pub trait LogicalClock: Send + Sync {
    /// Current height; expected to be monotonically non-decreasing.
    fn current_height(&self) -> u64;
}

/// Clock driven explicitly by the host (block applier, tests, replay tools).
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    pub fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    pub fn set(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Move the clock forward, saturating at `u64::MAX`. Returns the new height.
    pub fn advance(&self, by: u64) -> u64 {
        let previous = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(by))
            })
            .unwrap_or_else(|h| h);
        previous.saturating_add(by)
    }
}

impl LogicalClock for ManualClock {
    fn current_height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

//! Cooperative cancellation for a release run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag an operator-facing layer sets to stop the run.
///
/// The engine checks it before each step; a running command action polls it
/// and kills its child process when it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

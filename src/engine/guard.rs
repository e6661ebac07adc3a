use crate::error::EngineError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Binary latch against nested re-entry into mutating entrypoints.
///
/// `enter` hands out a scoped permit; the latch is released in the permit's
/// `Drop`, so every exit path, including error unwinds, restores the
/// not-entered state.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> Result<GuardPermit<'_>, EngineError> {
        if self.entered.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(EngineError::ReentrantCall);
        }
        Ok(GuardPermit { latch: &self.entered })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct GuardPermit<'a> {
    latch: &'a AtomicBool,
}

impl Drop for GuardPermit<'_> {
    fn drop(&mut self) {
        self.latch.store(false, Ordering::Release);
    }
}

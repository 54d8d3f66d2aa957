use crate::error::TrackerError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Teardown flag shared between a tracker and the host callbacks it installed.
///
/// Clones observe the same flag, so a frame callback queued by the host can
/// tell that the tracker it targets is gone.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check_cancelled(&self) -> Result<(), TrackerError> {
        if self.is_cancelled() {
            return Err(TrackerError::TornDown);
        }
        Ok(())
    }
}

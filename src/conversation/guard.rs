//! Once-only and one-at-a-time guards for conversation submissions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Ensures the opening turn of a session is dispatched exactly once.
///
/// The flag is claimed before any suspension point and never resets, not
/// even when the opening call fails.
#[derive(Debug, Default)]
pub struct InitGuard {
    claimed: AtomicBool,
}

impl InitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. Returns `true` for exactly one caller.
    pub fn try_claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

/// The in-flight flag shared by the text and voice submission paths.
///
/// `try_acquire()` checks and sets the flag in one step; the returned
/// permit clears it on drop, whichever way the submission ends.
#[derive(Debug, Clone, Default)]
pub struct SubmissionSlot {
    busy: Arc<AtomicBool>,
}

impl SubmissionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the slot. `None` while another submission is in flight.
    pub fn try_acquire(&self) -> Option<SubmissionPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof that the holder owns the submission slot.
#[derive(Debug)]
pub struct SubmissionPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

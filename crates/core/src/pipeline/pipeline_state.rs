use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Point-in-time copy of the pipeline counters.
///
/// `processed` counts completed detection passes, failed ones included;
/// `failed` is the subset whose detector call returned an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub submitted: usize,
    pub dropped: usize,
    pub processed: usize,
    pub failed: usize,
}

/// The busy flag plus counters shared between the capture context and the
/// detection completion path.
#[derive(Debug, Default)]
pub struct PipelineState {
    busy: AtomicBool,
    closed: AtomicBool,
    submitted: AtomicUsize,
    dropped: AtomicUsize,
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl PipelineState {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Claims the single detection slot. `None` when a pass is already running.
    pub(crate) fn try_acquire(self: &Arc<Self>) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                state: Arc::clone(self),
            })
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self, failed: bool) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Holds the detection slot; releasing happens on drop, so the flag is
/// cleared even when a detector or handler unwinds.
pub(crate) struct BusyGuard {
    state: Arc<PipelineState>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.busy.store(false, Ordering::Release);
    }
}

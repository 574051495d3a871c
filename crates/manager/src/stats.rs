//! crates/manager/src/stats.rs
//! Dispatch counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the manager's dispatch counters.
///
/// Counters are cumulative over the manager's lifetime and survive
/// `stop`/`start` cycles.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DispatchStats {
    /// Records that passed the filter.
    pub accepted: u64,
    /// Records rejected by threshold or flag mask.
    pub filtered: u64,
    /// Records dropped because the manager was idle.
    pub inactive: u64,
    /// Records handed to the registry, inline or by the delivery worker.
    pub delivered: u64,
    /// Individual destination failures.
    pub failed: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    accepted: AtomicU64,
    filtered: AtomicU64,
    inactive: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    pub(crate) fn accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inactive(&self) {
        self.inactive.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            inactive: self.inactive.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

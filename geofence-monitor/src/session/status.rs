//! Session counters and status snapshots.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::provider::LocationSample;

/// Lock-free counters updated by the sampling loop.
#[derive(Debug, Default)]
pub(crate) struct SessionCounters {
    running: AtomicBool,
    ticks_completed: AtomicU64,
    ticks_skipped: AtomicU64,
    events_emitted: AtomicU64,
    last_sample: Mutex<Option<LocationSample>>,
}

impl SessionCounters {
    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn tick_completed(&self) {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn tick_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn event_emitted(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sample(&self, sample: LocationSample) {
        *self.last_sample.lock() = Some(sample);
    }

    /// Point-in-time copy of the counters.
    pub(crate) fn snapshot(&self, geofence_count: usize) -> SessionStatus {
        SessionStatus {
            is_running: self.is_running(),
            geofence_count,
            last_sample: *self.last_sample.lock(),
            ticks_completed: self.ticks_completed.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Read-only view of a tracking session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub is_running: bool,
    /// Geofences currently in the store, active or not.
    pub geofence_count: usize,
    /// Most recent sample obtained from the provider.
    pub last_sample: Option<LocationSample>,
    /// Ticks that obtained a sample and were evaluated.
    pub ticks_completed: u64,
    /// Ticks skipped because the provider failed or timed out.
    pub ticks_skipped: u64,
    /// Events recorded since the session was created.
    pub events_emitted: u64,
}

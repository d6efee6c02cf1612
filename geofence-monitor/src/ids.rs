//! Identifier generation for geofences and events.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Generates unique, time-ordered identifiers of the form `{millis}-{seq}`.
///
/// The millisecond component never goes backwards within one generator, so
/// ids stay ordered even if the wall clock is stepped back.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: AtomicU64,
    sequence: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next identifier.
    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let millis = self.last_millis.fetch_max(now, Ordering::SeqCst).max(now);
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        format!("{}-{:04}", millis, seq)
    }
}

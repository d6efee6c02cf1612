//! Durable, capped history of crossing events.
//!
//! [`EventLog`] keeps events most-recent-first. Ordering is by insertion
//! only, never by timestamp, so a clock step backwards cannot reorder the
//! history. When the history grows past its cap the oldest entries are
//! dropped.

mod event;

pub use event::GeofenceEvent;

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::MonitorResult;
use crate::ids::IdGenerator;
use crate::membership::Crossing;
use crate::persist::{load_json, save_json_atomic};

/// Default number of events retained.
pub const DEFAULT_MAX_EVENTS: usize = 100;

/// Configuration for the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogConfig {
    /// Maximum number of events retained (at least 1).
    pub max_events: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl EventLogConfig {
    /// Set the retention cap. Values below 1 are raised to 1.
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events.max(1);
        self
    }
}

/// Durable event history, most recent first.
pub struct EventLog {
    path: PathBuf,
    max_events: usize,
    events: Mutex<Vec<GeofenceEvent>>,
    ids: IdGenerator,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("path", &self.path)
            .field("max_events", &self.max_events)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl EventLog {
    /// Open the log backed by `path`.
    ///
    /// A stored history longer than the cap is trimmed in memory; the file
    /// catches up on the next write.
    pub fn open(path: impl Into<PathBuf>, config: EventLogConfig) -> MonitorResult<Self> {
        let path = path.into();
        let max_events = config.max_events.max(1);
        let mut events: Vec<GeofenceEvent> = load_json(&path)?;
        events.truncate(max_events);

        debug!(path = %path.display(), count = events.len(), max_events, "Event log opened");

        Ok(Self {
            path,
            max_events,
            events: Mutex::new(events),
            ids: IdGenerator::new(),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retention cap.
    pub fn cap(&self) -> usize {
        self.max_events
    }

    /// Insert an event at the head of the history.
    ///
    /// Durable before returning. On error the in-memory history is unchanged.
    pub fn append(&self, event: GeofenceEvent) -> MonitorResult<()> {
        let mut events = self.events.lock();

        let mut next = Vec::with_capacity((events.len() + 1).min(self.max_events));
        next.push(event);
        next.extend(events.iter().take(self.max_events - 1).cloned());

        save_json_atomic(&self.path, &next)?;
        *events = next;
        Ok(())
    }

    /// Record a detected crossing as a new event and append it.
    pub fn record(&self, crossing: &Crossing) -> MonitorResult<GeofenceEvent> {
        let event = GeofenceEvent::from_crossing(self.ids.next_id(), crossing);
        self.append(event.clone())?;
        Ok(event)
    }

    /// All events, most recent first.
    pub fn list(&self) -> Vec<GeofenceEvent> {
        self.events.lock().clone()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every event. Irreversible.
    pub fn clear(&self) -> MonitorResult<()> {
        let mut events = self.events.lock();
        save_json_atomic(&self.path, &Vec::<GeofenceEvent>::new())?;
        let cleared = events.len();
        events.clear();
        info!(cleared, "Event history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::CrossingKind;
    use crate::provider::LocationSample;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn event(id: &str) -> GeofenceEvent {
        GeofenceEvent {
            id: id.to_string(),
            geofence_id: "g1".to_string(),
            geofence_name: "Office".to_string(),
            kind: CrossingKind::Entry,
            distance_meters: 10,
            timestamp: Utc::now(),
            location: None,
        }
    }

    fn open_log(dir: &TempDir, max_events: usize) -> EventLog {
        EventLog::open(
            dir.path().join("events.json"),
            EventLogConfig::default().with_max_events(max_events),
        )
        .unwrap()
    }

    fn ids(log: &EventLog) -> Vec<String> {
        log.list().into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_default_cap() {
        assert_eq!(EventLogConfig::default().max_events, 100);
        assert_eq!(EventLogConfig::default().with_max_events(0).max_events, 1);
    }

    #[test]
    fn test_append_is_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir, 10);

        for id in ["a", "b", "c"] {
            log.append(event(id)).unwrap();
        }

        assert_eq!(ids(&log), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir, 3);

        for i in 0..10 {
            log.append(event(&i.to_string())).unwrap();
            assert!(log.len() <= 3);
        }

        assert_eq!(ids(&log), vec!["9", "8", "7"]);
    }

    #[test]
    fn test_order_ignores_timestamps() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir, 10);

        let mut later = event("later");
        later.timestamp = Utc.timestamp_opt(2_000_000_000, 0).unwrap();
        let mut earlier = event("earlier");
        earlier.timestamp = later.timestamp - Duration::hours(1);

        log.append(later).unwrap();
        log.append(earlier).unwrap();

        assert_eq!(ids(&log), vec!["earlier", "later"]);
    }

    #[test]
    fn test_history_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let log = open_log(&dir, 10);
            log.append(event("a")).unwrap();
            log.append(event("b")).unwrap();
        }

        let reopened = open_log(&dir, 10);
        assert_eq!(ids(&reopened), vec!["b", "a"]);
    }

    #[test]
    fn test_reopen_with_smaller_cap_trims() {
        let dir = TempDir::new().unwrap();
        {
            let log = open_log(&dir, 10);
            for id in ["a", "b", "c", "d"] {
                log.append(event(id)).unwrap();
            }
        }

        let reopened = open_log(&dir, 2);
        assert_eq!(ids(&reopened), vec!["d", "c"]);
    }

    #[test]
    fn test_clear_is_durable() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir, 10);
        log.append(event("a")).unwrap();

        log.clear().unwrap();
        assert!(log.is_empty());
        assert!(open_log(&dir, 10).is_empty());
    }

    #[test]
    fn test_record_assigns_unique_ids() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir, 10);
        let crossing = Crossing {
            geofence_id: "g1".to_string(),
            geofence_name: "Office".to_string(),
            kind: CrossingKind::Exit,
            distance_meters: 2790.4,
            sample: LocationSample::now(37.80, -122.4194, 5.0),
        };

        let first = log.record(&crossing).unwrap();
        let second = log.record(&crossing).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.distance_meters, 2790);
        assert_eq!(log.list(), vec![second, first]);
    }

    #[test]
    fn test_failed_append_keeps_history() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir, 10);
        log.append(event("a")).unwrap();

        std::fs::create_dir(log.path().with_extension("tmp")).unwrap();
        assert!(log.append(event("b")).is_err());
        assert_eq!(ids(&log), vec!["a"]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn test_length_never_exceeds_cap(cap in 1usize..8, appends in 0usize..30) {
                let dir = TempDir::new().unwrap();
                let log = open_log(&dir, cap);

                for i in 0..appends {
                    log.append(event(&i.to_string())).unwrap();
                    prop_assert!(log.len() <= cap);
                }

                prop_assert_eq!(log.len(), appends.min(cap));
                if appends > 0 {
                    prop_assert_eq!(log.list()[0].id.clone(), (appends - 1).to_string());
                }
            }
        }
    }
}

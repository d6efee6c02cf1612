//! Integration tests for geofence tracking.
//!
//! These tests drive the public API end to end:
//! - Replayed track → tracking session → event log and sink
//! - Persistence of geofences and events across reopen
//! - Store mutations while a session is running
//!
//! Run with: `cargo test --test tracking_integration`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::mpsc;

use geofence_monitor::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Downtown San Francisco.
const SF: (f64, f64) = (37.7749, -122.4194);

/// Roughly 2.8km north of `SF`.
const SF_NORTH: (f64, f64) = (37.80, -122.4194);

fn sample(point: (f64, f64), second: u32) -> LocationSample {
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, second).unwrap();
    LocationSample::new(point.0, point.1, 5.0, timestamp)
}

fn fast_config() -> SessionConfig {
    SessionConfig::default()
        .with_interval(Duration::from_millis(10))
        .with_provider_timeout(Duration::from_millis(100))
        .with_sink_timeout(Duration::from_millis(100))
}

fn open_store(dir: &Path) -> Arc<GeofenceStore> {
    Arc::new(GeofenceStore::open(dir.join("geofences.json")).unwrap())
}

fn open_log(dir: &Path, max_events: usize) -> Arc<EventLog> {
    let config = EventLogConfig::default().with_max_events(max_events);
    Arc::new(EventLog::open(dir.join("events.json"), config).unwrap())
}

fn session_with(
    store: &Arc<GeofenceStore>,
    log: &Arc<EventLog>,
    provider: Arc<dyn LocationProvider>,
) -> (TrackingSession, mpsc::Receiver<GeofenceEvent>) {
    let (sink, events) = ChannelSink::new(64);
    let session = TrackingSession::new(
        fast_config(),
        Arc::clone(store),
        Arc::clone(log),
        provider,
        Arc::new(sink),
        Arc::new(StaticPermissionGate::granted()),
    );
    (session, events)
}

/// Wait until the replay is drained and one more tick has been skipped.
async fn drain(session: &TrackingSession, replay: &ReplayProvider) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !replay.is_exhausted() || session.status().ticks_skipped == 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out draining replay"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Inside, then 2.8km away, then back: one exit and one entry.
#[tokio::test]
async fn test_replayed_round_trip_produces_exit_then_entry() {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let log = open_log(dir.path(), 100);
    let office = store
        .add(GeofenceDefinition::new("Office", SF.0, SF.1, 1000.0))
        .unwrap();

    let replay = Arc::new(ReplayProvider::from_samples([
        sample(SF, 0),
        sample(SF_NORTH, 30),
        sample(SF, 59),
    ]));
    let (session, mut events) =
        session_with(&store, &log, Arc::clone(&replay) as Arc<dyn LocationProvider>);

    session.start().await.unwrap();
    drain(&session, &replay).await;
    session.stop().await.unwrap();

    let history = log.list();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, CrossingKind::Entry);
    assert_eq!(history[1].kind, CrossingKind::Exit);
    assert!(history.iter().all(|e| e.geofence_id == office.id));

    let exit = events.recv().await.unwrap();
    assert_eq!(exit.kind, CrossingKind::Exit);
    assert!((2785..=2795).contains(&exit.distance_meters));
    assert_eq!(exit.timestamp, sample(SF_NORTH, 30).timestamp);

    let entry = events.recv().await.unwrap();
    assert_eq!(entry.kind, CrossingKind::Entry);
    assert_eq!(entry.distance_meters, 0);

    let status = session.status();
    assert_eq!(status.ticks_completed, 3);
    assert_eq!(status.events_emitted, 2);
    assert_eq!(status.geofence_count, 1);
}

/// Starting outside a geofence reports nothing on the first sample.
#[tokio::test]
async fn test_first_sample_is_silent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let log = open_log(dir.path(), 100);
    store
        .add(GeofenceDefinition::new("Office", SF.0, SF.1, 1000.0))
        .unwrap();

    let replay = Arc::new(ReplayProvider::from_samples([
        sample(SF_NORTH, 0),
        sample(SF_NORTH, 30),
    ]));
    let (session, _events) =
        session_with(&store, &log, Arc::clone(&replay) as Arc<dyn LocationProvider>);

    session.start().await.unwrap();
    drain(&session, &replay).await;
    session.stop().await.unwrap();

    assert!(log.is_empty());
}

/// The circle boundary counts as inside.
#[tokio::test]
async fn test_boundary_is_inside() {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let log = open_log(dir.path(), 100);

    let here = Coordinate::new(SF.0, SF.1).unwrap();
    let there = Coordinate::new(SF_NORTH.0, SF_NORTH.1).unwrap();
    let radius = haversine_distance(&there, &here);
    store
        .add(GeofenceDefinition::new("Edge", SF.0, SF.1, radius))
        .unwrap();

    let replay = Arc::new(ReplayProvider::from_samples([
        sample(SF, 0),
        sample(SF_NORTH, 30),
    ]));
    let (session, _events) =
        session_with(&store, &log, Arc::clone(&replay) as Arc<dyn LocationProvider>);

    session.start().await.unwrap();
    drain(&session, &replay).await;
    session.stop().await.unwrap();

    assert!(log.is_empty());
}

/// Geofences and events survive reopening their files.
#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(dir.path());
        let log = open_log(dir.path(), 100);
        store
            .add(GeofenceDefinition::new("Office", SF.0, SF.1, 1000.0))
            .unwrap();

        let replay = Arc::new(ReplayProvider::from_samples([
            sample(SF, 0),
            sample(SF_NORTH, 30),
        ]));
        let (session, _events) =
            session_with(&store, &log, Arc::clone(&replay) as Arc<dyn LocationProvider>);
        session.start().await.unwrap();
        drain(&session, &replay).await;
        session.stop().await.unwrap();
    }

    let store = open_store(dir.path());
    let log = open_log(dir.path(), 100);
    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].name, "Office");
    assert_eq!(log.len(), 1);
    assert_eq!(log.list()[0].kind, CrossingKind::Exit);
}

/// The history keeps only the newest events.
#[tokio::test]
async fn test_history_is_capped() {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let log = open_log(dir.path(), 3);
    store
        .add(GeofenceDefinition::new("Office", SF.0, SF.1, 1000.0))
        .unwrap();

    let track = (0..8).map(|i| sample(if i % 2 == 0 { SF } else { SF_NORTH }, i));
    let replay = Arc::new(ReplayProvider::from_samples(track));
    let (session, _events) =
        session_with(&store, &log, Arc::clone(&replay) as Arc<dyn LocationProvider>);

    session.start().await.unwrap();
    drain(&session, &replay).await;
    session.stop().await.unwrap();

    let history = log.list();
    assert_eq!(history.len(), 3);
    assert_eq!(session.status().events_emitted, 7);
    // Newest first: the last sample was outside.
    assert_eq!(history[0].kind, CrossingKind::Exit);
    assert_eq!(history[0].timestamp, sample(SF_NORTH, 7).timestamp);
}

/// Removing a geofence mid-session stops its events.
#[tokio::test]
async fn test_remove_while_running() {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let log = open_log(dir.path(), 100);
    let office = store
        .add(GeofenceDefinition::new("Office", SF.0, SF.1, 1000.0))
        .unwrap();

    let provider = Arc::new(ManualProvider::at(SF.0, SF.1));
    let (session, _events) =
        session_with(&store, &log, Arc::clone(&provider) as Arc<dyn LocationProvider>);

    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    store.remove(&office.id).unwrap();
    provider.set_position(SF_NORTH.0, SF_NORTH.1, 5.0);
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.stop().await.unwrap();

    assert!(log.is_empty());
    assert_eq!(session.status().geofence_count, 0);
}

/// One session per handle: start twice fails, stop then start works.
#[tokio::test]
async fn test_lifecycle_errors() {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let log = open_log(dir.path(), 100);
    let (session, _events) = session_with(&store, &log, Arc::new(ManualProvider::at(SF.0, SF.1)));

    assert!(matches!(session.stop().await, Err(MonitorError::NotRunning)));
    session.start().await.unwrap();
    assert!(matches!(
        session.start().await,
        Err(MonitorError::AlreadyRunning)
    ));
    session.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    session.start().await.unwrap();
    session.stop().await.unwrap();
}

/// Invalid definitions are rejected before anything is written.
#[tokio::test]
async fn test_invalid_definitions_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());

    for definition in [
        GeofenceDefinition::new("", SF.0, SF.1, 100.0),
        GeofenceDefinition::new("Bad lat", 91.0, SF.1, 100.0),
        GeofenceDefinition::new("Bad lon", SF.0, -181.0, 100.0),
        GeofenceDefinition::new("Zero radius", SF.0, SF.1, 0.0),
    ] {
        let err = store.add(definition).unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err}");
    }

    assert!(store.is_empty());
    assert!(!dir.path().join("geofences.json").exists());
}

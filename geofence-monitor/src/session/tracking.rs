//! Tracking session lifecycle.

use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::sampler::SamplingLoop;
use super::status::{SessionCounters, SessionStatus};
use super::SessionConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::history::EventLog;
use crate::membership::{MembershipState, MembershipTracker};
use crate::permission::PermissionGate;
use crate::provider::LocationProvider;
use crate::sink::NotificationSink;
use crate::store::GeofenceStore;

/// Lifecycle state of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
}

enum Lifecycle {
    Idle,
    Running {
        shutdown: CancellationToken,
        handle: JoinHandle<()>,
    },
}

/// A geofence monitoring session.
///
/// Constructed with its collaborators injected; each instance owns its own
/// membership state, so several sessions (or tests) can coexist.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use geofence_monitor::prelude::*;
///
/// let session = TrackingSession::new(
///     SessionConfig::default(),
///     store,
///     log,
///     Arc::new(ManualProvider::at(37.7749, -122.4194)),
///     Arc::new(LogSink),
///     Arc::new(StaticPermissionGate::granted()),
/// );
///
/// session.start().await?;
/// println!("{:?}", session.status());
/// session.stop().await?;
/// ```
pub struct TrackingSession {
    config: SessionConfig,
    store: Arc<GeofenceStore>,
    log: Arc<EventLog>,
    provider: Arc<dyn LocationProvider>,
    sink: Arc<dyn NotificationSink>,
    permission: Arc<dyn PermissionGate>,
    membership: Arc<SyncMutex<MembershipTracker>>,
    counters: Arc<SessionCounters>,
    /// Held across the whole of `start` and `stop`, so at most one loop exists.
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for TrackingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingSession")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl TrackingSession {
    pub fn new(
        config: SessionConfig,
        store: Arc<GeofenceStore>,
        log: Arc<EventLog>,
        provider: Arc<dyn LocationProvider>,
        sink: Arc<dyn NotificationSink>,
        permission: Arc<dyn PermissionGate>,
    ) -> Self {
        Self {
            config,
            store,
            log,
            provider,
            sink,
            permission,
            membership: Arc::new(SyncMutex::new(MembershipTracker::new())),
            counters: Arc::new(SessionCounters::default()),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start sampling.
    ///
    /// Fails with [`MonitorError::PermissionDenied`] if the permission gate
    /// refuses and with [`MonitorError::AlreadyRunning`] if the session is
    /// running. Every geofence starts out `Unknown`. Must be called within a
    /// Tokio runtime.
    pub async fn start(&self) -> MonitorResult<()> {
        if !self.permission.may_sample() {
            warn!("Tracking not started: location permission denied");
            return Err(MonitorError::PermissionDenied);
        }

        let mut lifecycle = self.lifecycle.lock().await;
        if matches!(*lifecycle, Lifecycle::Running { .. }) {
            return Err(MonitorError::AlreadyRunning);
        }

        let geofences = self.store.snapshot();
        self.membership.lock().clear();

        let shutdown = CancellationToken::new();
        let sampler = SamplingLoop {
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            log: Arc::clone(&self.log),
            provider: Arc::clone(&self.provider),
            sink: Arc::clone(&self.sink),
            membership: Arc::clone(&self.membership),
            counters: Arc::clone(&self.counters),
        };
        let changes = self.store.subscribe();
        let handle = tokio::spawn(sampler.run(shutdown.clone(), changes));

        *lifecycle = Lifecycle::Running { shutdown, handle };
        self.counters.set_running(true);

        info!(
            geofences = geofences.len(),
            active = geofences.iter().filter(|g| g.is_active).count(),
            "Tracking started"
        );
        Ok(())
    }

    /// Stop sampling and wait for the loop to exit.
    ///
    /// A tick waiting on the provider is abandoned; a tick already holding a
    /// sample finishes first. Membership state is discarded.
    pub async fn stop(&self) -> MonitorResult<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        let (shutdown, handle) = match std::mem::replace(&mut *lifecycle, Lifecycle::Idle) {
            Lifecycle::Idle => return Err(MonitorError::NotRunning),
            Lifecycle::Running { shutdown, handle } => (shutdown, handle),
        };

        shutdown.cancel();
        if let Err(e) = handle.await {
            warn!(error = %e, "Sampling loop ended abnormally");
        }

        self.counters.set_running(false);
        self.membership.lock().clear();
        info!("Tracking stopped");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.counters.is_running() {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Snapshot of the session. Never blocks on a running tick.
    pub fn status(&self) -> SessionStatus {
        self.counters.snapshot(self.store.len())
    }

    /// Membership of the user in a geofence as seen by this session.
    pub fn membership(&self, geofence_id: &str) -> MembershipState {
        self.membership.lock().state(geofence_id)
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if let Lifecycle::Running { shutdown, .. } = self.lifecycle.get_mut() {
            shutdown.cancel();
        }
    }
}

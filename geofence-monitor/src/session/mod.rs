//! Tracking sessions.
//!
//! A [`TrackingSession`] runs the sampling loop that connects every other
//! component:
//!
//! ```text
//! ┌──────────────────┐   sample    ┌──────────────────────┐
//! │ LocationProvider │ ──────────► │    SamplingLoop      │
//! └──────────────────┘             │  (one tokio task)    │
//!                                  │                      │
//! ┌──────────────────┐  snapshot   │  MembershipTracker   │
//! │  GeofenceStore   │ ──────────► │   Unknown/In/Out     │
//! └──────────────────┘             └──────────┬───────────┘
//!                                             │ crossings
//!                              ┌──────────────┴─────────────┐
//!                              ▼                            ▼
//!                      ┌──────────────┐           ┌──────────────────┐
//!                      │   EventLog   │           │ NotificationSink │
//!                      └──────────────┘           └──────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! Idle --[start]--> Running --[stop]--> Idle
//! ```
//!
//! `start` on a running session fails with `AlreadyRunning`; `stop` on an
//! idle one fails with `NotRunning`.

mod sampler;
mod status;
mod tracking;

pub use status::SessionStatus;
pub use tracking::{SessionState, TrackingSession};

use std::time::Duration;

/// Default time between samples.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Default upper bound on one provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Default upper bound on one sink publication.
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_millis(500);

/// Shortest accepted sampling interval.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a tracking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time between ticks.
    pub interval: Duration,
    /// Maximum wait for a location sample before skipping the tick.
    pub provider_timeout: Duration,
    /// Maximum wait for the notification sink.
    pub sink_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            sink_timeout: DEFAULT_SINK_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Set the sampling interval (clamped to at least 1ms).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_sink_timeout(mut self, timeout: Duration) -> Self {
        self.sink_timeout = timeout;
        self
    }
}

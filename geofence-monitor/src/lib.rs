//! Geofence Monitor - circular geofence tracking with entry/exit detection
//!
//! This library keeps a durable set of circular geofences, samples a
//! location provider on a fixed interval, and reports every transition
//! between inside and outside as an event. Events are appended to a bounded
//! history and handed to a notification sink.
//!
//! The main entry point is [`session::TrackingSession`]; most applications
//! only need the items in [`prelude`].

pub mod config;
pub mod error;
pub mod geo;
pub mod history;
pub mod logging;
pub mod membership;
pub mod permission;
pub mod provider;
pub mod session;
pub mod sink;
pub mod store;

mod ids;
mod persist;

/// Version of the geofence-monitor library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types.
pub mod prelude {
    pub use crate::config::ConfigFile;
    pub use crate::error::{MonitorError, MonitorResult};
    pub use crate::geo::{format_distance, haversine_distance, Coordinate};
    pub use crate::history::{EventLog, EventLogConfig, GeofenceEvent};
    pub use crate::membership::CrossingKind;
    pub use crate::permission::{PermissionGate, StaticPermissionGate};
    pub use crate::provider::{LocationProvider, LocationSample, ManualProvider, ReplayProvider};
    pub use crate::session::{SessionConfig, SessionState, SessionStatus, TrackingSession};
    pub use crate::sink::{ChannelSink, LogSink, NotificationSink};
    pub use crate::store::{Geofence, GeofenceDefinition, GeofenceStore, GeofenceUpdate};
}

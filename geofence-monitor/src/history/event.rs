//! Recorded crossing events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::format_distance;
use crate::membership::{Crossing, CrossingKind};
use crate::provider::LocationSample;

/// An entry or exit that was recorded in the event history.
///
/// The geofence name is copied at creation time so history stays readable
/// after the geofence is deleted or renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceEvent {
    pub id: String,
    pub geofence_id: String,
    pub geofence_name: String,
    #[serde(rename = "type")]
    pub kind: CrossingKind,
    /// Distance to the geofence center, rounded to whole meters.
    pub distance_meters: u64,
    pub timestamp: DateTime<Utc>,
    /// The sample that triggered the crossing, if known.
    pub location: Option<LocationSample>,
}

impl GeofenceEvent {
    /// Build an event from a detected crossing.
    ///
    /// The event time is the sample time, not the wall clock.
    pub fn from_crossing(id: impl Into<String>, crossing: &Crossing) -> Self {
        Self {
            id: id.into(),
            geofence_id: crossing.geofence_id.clone(),
            geofence_name: crossing.geofence_name.clone(),
            kind: crossing.kind,
            distance_meters: crossing.distance_meters.max(0.0).round() as u64,
            timestamp: crossing.sample.timestamp,
            location: Some(crossing.sample),
        }
    }

    /// One-line summary, e.g. `entry "Office" at 12m`.
    pub fn summary(&self) -> String {
        format!(
            "{} \"{}\" at {}",
            self.kind,
            self.geofence_name,
            format_distance(self.distance_meters as f64)
        )
    }
}

//! Provider that plays back a recorded track.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Deserialize;

use super::{BoxFuture, LocationProvider, LocationSample, ProviderError};
use crate::error::{MonitorError, MonitorResult};

/// One point of a recorded track file.
///
/// `accuracy_meters` and `timestamp` are optional; missing timestamps are
/// filled in when the point is replayed.
#[derive(Debug, Clone, Deserialize)]
struct TrackPoint {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    accuracy_meters: Option<f64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Replays samples in order, one per call, then reports unavailable.
#[derive(Debug)]
pub struct ReplayProvider {
    points: Mutex<VecDeque<TrackPoint>>,
}

impl ReplayProvider {
    /// Replay the given samples as-is.
    pub fn from_samples(samples: impl IntoIterator<Item = LocationSample>) -> Self {
        let points = samples
            .into_iter()
            .map(|s| TrackPoint {
                latitude: s.latitude,
                longitude: s.longitude,
                accuracy_meters: Some(s.accuracy_meters),
                timestamp: Some(s.timestamp),
            })
            .collect();
        Self {
            points: Mutex::new(points),
        }
    }

    /// Load a track from a JSON array of points.
    ///
    /// ```json
    /// [
    ///   { "latitude": 37.7749, "longitude": -122.4194 },
    ///   { "latitude": 37.80, "longitude": -122.4194, "accuracy_meters": 8.0 }
    /// ]
    /// ```
    pub fn from_file(path: &Path) -> MonitorResult<Self> {
        let file = File::open(path).map_err(|e| MonitorError::storage(path, e))?;
        let points: VecDeque<TrackPoint> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                MonitorError::storage(
                    path,
                    io::Error::new(io::ErrorKind::InvalidData, format!("invalid track: {}", e)),
                )
            })?;
        Ok(Self {
            points: Mutex::new(points),
        })
    }

    /// Samples not yet replayed.
    pub fn remaining(&self) -> usize {
        self.points.lock().len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl LocationProvider for ReplayProvider {
    fn current_sample(
        &self,
        _timeout: Duration,
    ) -> BoxFuture<'_, Result<LocationSample, ProviderError>> {
        let result = self
            .points
            .lock()
            .pop_front()
            .map(|p| LocationSample {
                latitude: p.latitude,
                longitude: p.longitude,
                accuracy_meters: p.accuracy_meters.unwrap_or(0.0),
                timestamp: p.timestamp.unwrap_or_else(Utc::now),
            })
            .ok_or_else(|| ProviderError::Unavailable("replay exhausted".to_string()));
        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        "replay"
    }
}

//! Provider whose position is set by the caller.

use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

use super::{BoxFuture, LocationProvider, LocationSample, ProviderError};

/// Returns the most recently set position on every call.
///
/// Useful for pinning the user to a fixed point or for driving a session
/// from another component (a UI, a test).
#[derive(Debug, Default)]
pub struct ManualProvider {
    current: Mutex<Option<LocationSample>>,
}

impl ManualProvider {
    /// Create a provider with no position; calls fail until one is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider already holding a position.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        let provider = Self::new();
        provider.set_position(latitude, longitude, 0.0);
        provider
    }

    /// Replace the current position.
    pub fn set_position(&self, latitude: f64, longitude: f64, accuracy_meters: f64) {
        *self.current.lock() = Some(LocationSample::now(latitude, longitude, accuracy_meters));
    }

    /// Forget the current position; subsequent calls report unavailable.
    pub fn clear(&self) {
        *self.current.lock() = None;
    }

    /// The position that will be returned next.
    pub fn position(&self) -> Option<LocationSample> {
        *self.current.lock()
    }
}

impl LocationProvider for ManualProvider {
    fn current_sample(
        &self,
        _timeout: Duration,
    ) -> BoxFuture<'_, Result<LocationSample, ProviderError>> {
        let result = self
            .position()
            .map(|sample| LocationSample {
                timestamp: Utc::now(),
                ..sample
            })
            .ok_or_else(|| ProviderError::Unavailable("no position set".to_string()));
        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        "manual"
    }
}

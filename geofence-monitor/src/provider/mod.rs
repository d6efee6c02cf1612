//! Location providers.
//!
//! The tracking session never acquires positions itself. It asks a
//! [`LocationProvider`] for one sample per tick and treats every provider
//! failure as a skipped tick.
//!
//! # Dyn Compatibility
//!
//! `current_sample` returns a boxed future so providers can be shared as
//! `Arc<dyn LocationProvider>`.
//!
//! # Providers
//!
//! - [`ManualProvider`] returns whatever position the caller last set
//! - [`ReplayProvider`] plays back a recorded sequence, one sample per call

mod manual;
mod replay;

pub use manual::ManualProvider;
pub use replay::ReplayProvider;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated horizontal accuracy in meters.
    pub accuracy_meters: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(
        latitude: f64,
        longitude: f64,
        accuracy_meters: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
            timestamp,
        }
    }

    /// A sample taken now.
    pub fn now(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self::new(latitude, longitude, accuracy_meters, Utc::now())
    }

    /// Check that the position is a real coordinate.
    pub fn validate(&self) -> Result<Coordinate, ProviderError> {
        Coordinate::new(self.latitude, self.longitude)
            .map_err(|e| ProviderError::InvalidSample(e.to_string()))
    }

    /// The position without range checks; see [`LocationSample::validate`].
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Transient provider failures. Never fatal to a tracking session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No sample arrived within the allotted time.
    #[error("Location provider timed out after {0:?}")]
    Timeout(Duration),

    /// The provider cannot produce a sample right now.
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    /// The provider returned a position that is not on Earth.
    #[error("Invalid location sample: {0}")]
    InvalidSample(String),
}

/// Source of position samples.
pub trait LocationProvider: Send + Sync {
    /// Produce the current position, giving up after `timeout`.
    ///
    /// Implementations should honour `timeout`; the session additionally
    /// enforces it, so a provider that overruns is reported as
    /// [`ProviderError::Timeout`].
    fn current_sample(&self, timeout: Duration) -> BoxFuture<'_, Result<LocationSample, ProviderError>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

//! The periodic sampling loop behind a running session.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::status::SessionCounters;
use super::{SessionConfig, MIN_INTERVAL};
use crate::history::EventLog;
use crate::membership::MembershipTracker;
use crate::provider::{LocationProvider, LocationSample, ProviderError};
use crate::sink::NotificationSink;
use crate::store::{GeofenceChange, GeofenceStore};

/// Everything one sampling loop needs. Runs as a single task, so ticks
/// never overlap.
pub(crate) struct SamplingLoop {
    pub(crate) config: SessionConfig,
    pub(crate) store: Arc<GeofenceStore>,
    pub(crate) log: Arc<EventLog>,
    pub(crate) provider: Arc<dyn LocationProvider>,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) membership: Arc<Mutex<MembershipTracker>>,
    pub(crate) counters: Arc<SessionCounters>,
}

impl SamplingLoop {
    /// Run until `shutdown` is cancelled.
    ///
    /// The first tick fires immediately. Store changes are applied between
    /// ticks; a removal drops membership state at once, everything else is
    /// picked up by the snapshot refresh at the start of the next tick.
    pub(crate) async fn run(
        self,
        shutdown: CancellationToken,
        mut changes: broadcast::Receiver<GeofenceChange>,
    ) {
        info!(
            provider = self.provider.name(),
            interval_ms = self.config.interval.as_millis() as u64,
            "Sampling loop starting"
        );

        let mut interval = time::interval(self.config.interval.max(MIN_INTERVAL));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut listening = true;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Sampling loop shutting down");
                    break;
                }

                change = changes.recv(), if listening => match change {
                    Ok(change) => self.apply_change(change),
                    Err(RecvError::Lagged(missed)) => {
                        debug!(missed, "Missed geofence changes; next tick reconciles");
                    }
                    Err(RecvError::Closed) => listening = false,
                },

                _ = interval.tick() => self.tick(&shutdown).await,
            }
        }
    }

    fn apply_change(&self, change: GeofenceChange) {
        if let GeofenceChange::Removed { id } = change {
            if self.membership.lock().forget(&id) {
                debug!(geofence = %id, "Dropped membership state for removed geofence");
            }
        }
    }

    /// One tick: sample, evaluate, record, publish.
    ///
    /// Cancellation is honoured only while waiting for the provider. Once a
    /// sample is in hand the tick runs to completion, so the event log never
    /// sees a partially processed sample.
    async fn tick(&self, shutdown: &CancellationToken) {
        let sample = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("Tick abandoned while waiting for provider");
                return;
            }

            result = self.sample() => match result {
                Ok(sample) => sample,
                Err(e) => {
                    self.counters.tick_skipped();
                    warn!(error = %e, "Skipping tick");
                    return;
                }
            },
        };

        self.counters.record_sample(sample);

        let snapshot = self.store.snapshot();
        let crossings = self.membership.lock().evaluate(&snapshot, &sample);

        debug!(
            lat = sample.latitude,
            lon = sample.longitude,
            geofences = snapshot.len(),
            crossings = crossings.len(),
            "Tick evaluated"
        );

        for crossing in &crossings {
            let event = match self.log.record(crossing) {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        error = %e,
                        geofence = %crossing.geofence_id,
                        kind = %crossing.kind,
                        "Failed to record geofence event; retrying next tick"
                    );
                    self.membership.lock().rollback(crossing);
                    continue;
                }
            };

            self.counters.event_emitted();
            info!(
                geofence = %event.geofence_name,
                kind = %event.kind,
                distance_m = event.distance_meters,
                "Geofence crossing"
            );

            if time::timeout(self.config.sink_timeout, self.sink.publish(event))
                .await
                .is_err()
            {
                warn!(
                    timeout_ms = self.config.sink_timeout.as_millis() as u64,
                    "Notification sink timed out"
                );
            }
        }

        self.counters.tick_completed();
    }

    /// Ask the provider for a sample, enforcing the provider timeout.
    /// Samples outside the valid coordinate range are rejected.
    async fn sample(&self) -> Result<LocationSample, ProviderError> {
        let timeout = self.config.provider_timeout;
        let sample = match time::timeout(timeout, self.provider.current_sample(timeout)).await {
            Ok(result) => result?,
            Err(_) => return Err(ProviderError::Timeout(timeout)),
        };
        sample.validate()?;
        Ok(sample)
    }
}

//! Notification sinks.
//!
//! The tracking session hands every recorded event to a [`NotificationSink`].
//! Publication is fire-and-forget: a sink cannot fail the tick, and the
//! session bounds how long it waits for one.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::history::GeofenceEvent;
use crate::provider::BoxFuture;

/// Receiver of crossing events.
pub trait NotificationSink: Send + Sync {
    /// Deliver an event. Must not block for long; the caller enforces a
    /// timeout and abandons slow deliveries.
    fn publish(&self, event: GeofenceEvent) -> BoxFuture<'_, ()>;
}

/// Publishes events as structured log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn publish(&self, event: GeofenceEvent) -> BoxFuture<'_, ()> {
        info!(
            event_id = %event.id,
            geofence = %event.geofence_name,
            kind = %event.kind,
            distance_m = event.distance_meters,
            "Geofence {}",
            event.summary()
        );
        Box::pin(async {})
    }
}

/// Forwards events into a bounded channel without waiting.
///
/// When the channel is full or closed the event is dropped with a warning;
/// the history in the event log is unaffected.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<GeofenceEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<GeofenceEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn publish(&self, event: GeofenceEvent) -> BoxFuture<'_, ()> {
        if let Err(e) = self.tx.try_send(event) {
            warn!(error = %e, "Dropping geofence notification");
        }
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::CrossingKind;
    use chrono::Utc;

    fn event(id: &str) -> GeofenceEvent {
        GeofenceEvent {
            id: id.to_string(),
            geofence_id: "g1".to_string(),
            geofence_name: "Office".to_string(),
            kind: CrossingKind::Exit,
            distance_meters: 1200,
            timestamp: Utc::now(),
            location: None,
        }
    }

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelSink::new(4);
        sink.publish(event("e1")).await;
        assert_eq!(rx.recv().await.unwrap().id, "e1");
    }

    #[tokio::test]
    async fn test_channel_sink_drops_when_full() {
        let (sink, mut rx) = ChannelSink::new(1);
        sink.publish(event("e1")).await;
        sink.publish(event("e2")).await;

        assert_eq!(rx.recv().await.unwrap().id, "e1");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelSink::new(1);
        drop(rx);
        sink.publish(event("e1")).await;
    }

    #[tokio::test]
    async fn test_log_sink_completes() {
        LogSink.publish(event("e1")).await;
    }
}

//! Track command - run a tracking session in the foreground.
//!
//! Positions come either from a replayed JSON track or from a fixed
//! coordinate. Crossings are printed as they happen; Ctrl+C stops the
//! session. A replay stops by itself once the track is exhausted.
//!
//! The session reads geofences once at startup and keeps its own copy.
//! Changes made by other processes (`add`, `remove`, `disable`, ...) take
//! effect after the session is restarted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use geofence_monitor::geo::Coordinate;
use geofence_monitor::history::GeofenceEvent;
use geofence_monitor::permission::StaticPermissionGate;
use geofence_monitor::provider::{LocationProvider, ManualProvider, ReplayProvider};
use geofence_monitor::session::{SessionStatus, TrackingSession};
use geofence_monitor::sink::ChannelSink;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::events::format_event;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Capacity of the channel between the session and the printer.
const EVENT_BUFFER: usize = 256;

/// How often the foreground loop checks for replay completion.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where positions come from.
pub enum PositionSource {
    Replay(PathBuf),
    Fixed {
        latitude: f64,
        longitude: f64,
        accuracy: f64,
    },
}

impl PositionSource {
    /// Reject a fixed position that is not a valid coordinate.
    fn validate(&self) -> Result<(), CliError> {
        if let PositionSource::Fixed {
            latitude,
            longitude,
            ..
        } = self
        {
            Coordinate::new(*latitude, *longitude)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?;
        }
        Ok(())
    }
}

/// Arguments for the track command.
pub struct TrackArgs {
    pub source: PositionSource,
    /// Overrides `tracking.interval_secs`.
    pub interval_secs: Option<u64>,
}

/// Run the track command.
pub fn run(runner: &CliRunner, args: TrackArgs) -> Result<(), CliError> {
    args.source.validate()?;

    let store = runner.open_store()?;
    let log = runner.open_log()?;

    let mut session_config = runner.config().session_config();
    if let Some(secs) = args.interval_secs {
        if secs == 0 {
            return Err(CliError::InvalidInput(
                "--interval must be at least 1 second".to_string(),
            ));
        }
        session_config = session_config.with_interval(Duration::from_secs(secs));
    }

    let (provider, replay): (Arc<dyn LocationProvider>, Option<Arc<ReplayProvider>>) =
        match args.source {
            PositionSource::Replay(path) => {
                let replay = Arc::new(ReplayProvider::from_file(&path)?);
                println!("Replaying {} position(s) from {}", replay.remaining(), path.display());
                (Arc::clone(&replay) as Arc<dyn LocationProvider>, Some(replay))
            }
            PositionSource::Fixed {
                latitude,
                longitude,
                accuracy,
            } => {
                let manual = ManualProvider::new();
                manual.set_position(latitude, longitude, accuracy);
                (Arc::new(manual), None)
            }
        };

    let (sink, events) = ChannelSink::new(EVENT_BUFFER);
    let session = TrackingSession::new(
        session_config,
        Arc::clone(&store),
        log,
        provider,
        Arc::new(sink),
        Arc::new(StaticPermissionGate::granted()),
    );

    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    println!(
        "Tracking {} geofence(s) every {}s. Press Ctrl+C to stop.",
        store.len(),
        session.config().interval.as_secs()
    );
    println!();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::RuntimeCreation)?;

    let status = runtime.block_on(drive(&session, events, replay.as_deref(), &shutdown))?;
    print_summary(&status);
    Ok(())
}

/// Run the session until cancelled or the replay is drained, printing events.
async fn drive(
    session: &TrackingSession,
    mut events: mpsc::Receiver<GeofenceEvent>,
    replay: Option<&ReplayProvider>,
    shutdown: &CancellationToken,
) -> Result<SessionStatus, CliError> {
    session.start().await?;

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(event) = events.recv() => println!("{}", format_event(&event)),
            _ = poll.tick() => {
                if replay.is_some_and(|r| replay_finished(r, &session.status())) {
                    debug!("Replay exhausted");
                    break;
                }
            }
        }
    }

    session.stop().await?;
    while let Ok(event) = events.try_recv() {
        println!("{}", format_event(&event));
    }
    Ok(session.status())
}

/// A replay is finished once it is empty and a later tick found nothing.
fn replay_finished(replay: &ReplayProvider, status: &SessionStatus) -> bool {
    replay.is_exhausted() && status.ticks_skipped > 0
}

fn print_summary(status: &SessionStatus) {
    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  Samples evaluated: {}", status.ticks_completed);
    println!("  Samples skipped:   {}", status.ticks_skipped);
    println!("  Events recorded:   {}", status.events_emitted);
    if let Some(sample) = status.last_sample {
        println!(
            "  Last position:     {} (±{:.0}m)",
            sample.coordinate(),
            sample.accuracy_meters
        );
    }
}

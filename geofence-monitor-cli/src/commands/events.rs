//! Event history commands.

use geofence_monitor::history::{EventLog, GeofenceEvent};

use crate::error::CliError;

/// One printable line for an event.
pub fn format_event(event: &GeofenceEvent) -> String {
    let mut line = format!(
        "[{}] {}",
        event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        event.summary()
    );
    if let Some(location) = &event.location {
        line.push_str(&format!(" ({})", location.coordinate()));
    }
    line
}

/// Print the newest `limit` events, newest first.
pub fn list(log: &EventLog, limit: Option<usize>) -> Result<(), CliError> {
    let events = log.list();
    if events.is_empty() {
        println!("No events recorded.");
        return Ok(());
    }

    let shown = limit.unwrap_or(events.len()).min(events.len());
    for event in events.iter().take(shown) {
        println!("{}", format_event(event));
    }
    if shown < events.len() {
        println!("... {} older event(s) not shown", events.len() - shown);
    }
    Ok(())
}

/// Delete all recorded events.
pub fn clear(log: &EventLog) -> Result<(), CliError> {
    let count = log.len();
    log.clear()?;
    println!("Cleared {} event(s)", count);
    Ok(())
}

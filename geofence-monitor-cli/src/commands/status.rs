//! Status command - summary of stored geofences and history.

use geofence_monitor::history::EventLog;
use geofence_monitor::store::GeofenceStore;

use super::events::format_event;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Print where data lives and what it contains.
pub fn run(runner: &CliRunner, store: &GeofenceStore, log: &EventLog) -> Result<(), CliError> {
    let config = runner.config();
    let geofences = store.list();
    let active = geofences.iter().filter(|g| g.is_active).count();

    println!("Geofence Monitor v{}", geofence_monitor::VERSION);
    println!("=======================");
    println!();
    println!("Config:     {}", runner.config_path().display());
    println!("Geofences:  {}", store.path().display());
    println!("Events:     {}", log.path().display());
    println!();
    println!("Geofences:  {} ({} active)", geofences.len(), active);
    println!("Events:     {} of {} kept", log.len(), log.cap());
    println!(
        "Interval:   {}s (provider timeout {}s)",
        config.tracking.interval_secs, config.tracking.provider_timeout_secs
    );

    if let Some(latest) = log.list().first() {
        println!();
        println!("Latest event:");
        println!("  {}", format_event(latest));
    }
    Ok(())
}

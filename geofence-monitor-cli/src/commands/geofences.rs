//! Geofence management commands: add, list, remove, enable, disable, update.

use geofence_monitor::store::{Geofence, GeofenceDefinition, GeofenceStore, GeofenceUpdate};

use crate::error::CliError;

/// Add a geofence.
pub fn add(
    store: &GeofenceStore,
    name: String,
    latitude: f64,
    longitude: f64,
    radius: f64,
) -> Result<(), CliError> {
    let geofence = store.add(GeofenceDefinition::new(name, latitude, longitude, radius))?;
    println!("Added geofence {}", geofence.id);
    println!("  {}", geofence);
    Ok(())
}

/// Print all geofences as a table.
pub fn list(store: &GeofenceStore) -> Result<(), CliError> {
    let geofences = store.list();
    if geofences.is_empty() {
        println!("No geofences defined. Add one with 'geofence-monitor add'.");
        return Ok(());
    }

    println!(
        "{:<20} {:<24} {:<26} {:>8}  {}",
        "ID", "NAME", "CENTER", "RADIUS", "ACTIVE"
    );
    for geofence in &geofences {
        print_row(geofence);
    }
    println!();
    println!(
        "{} geofence(s), {} active",
        geofences.len(),
        geofences.iter().filter(|g| g.is_active).count()
    );
    Ok(())
}

fn print_row(geofence: &Geofence) {
    println!(
        "{:<20} {:<24} {:<26} {:>8}  {}",
        geofence.id,
        truncate(&geofence.name, 24),
        geofence.center.to_string(),
        geofence.radius_display(),
        if geofence.is_active { "yes" } else { "no" }
    );
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Remove a geofence.
pub fn remove(store: &GeofenceStore, id: &str) -> Result<(), CliError> {
    let removed = store.remove(id)?;
    println!("Removed geofence {} \"{}\"", removed.id, removed.name);
    Ok(())
}

/// Enable or disable a geofence.
pub fn set_active(store: &GeofenceStore, id: &str, active: bool) -> Result<(), CliError> {
    let geofence = store.update(id, GeofenceUpdate::new().with_active(active))?;
    println!(
        "{} geofence {} \"{}\"",
        if active { "Enabled" } else { "Disabled" },
        geofence.id,
        geofence.name
    );
    Ok(())
}

/// Rename a geofence or change its radius.
pub fn update(
    store: &GeofenceStore,
    id: &str,
    name: Option<String>,
    radius: Option<f64>,
) -> Result<(), CliError> {
    let mut update = GeofenceUpdate::new();
    if let Some(name) = name {
        update = update.with_name(name);
    }
    if let Some(radius) = radius {
        update = update.with_radius(radius);
    }
    if update.is_empty() {
        return Err(CliError::InvalidInput(
            "Nothing to update. Pass --name and/or --radius.".to_string(),
        ));
    }

    let geofence = store.update(id, update)?;
    println!("Updated geofence {}", geofence.id);
    println!("  {}", geofence);
    Ok(())
}

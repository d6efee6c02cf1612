//! Geographic math.
//!
//! Provides great-circle distance on a spherical Earth and display helpers
//! for distances.

mod types;

pub use types::{CoordError, Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
///
/// Uses the haversine formula, which stays numerically stable for the short
/// distances geofences care about.
#[inline]
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h just outside [0, 1] near antipodes.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Format a distance for display.
///
/// Distances under one kilometer are shown in whole meters, larger ones in
/// kilometers with one decimal (`"850m"`, `"2.8km"`).
pub fn format_distance(meters: f64) -> String {
    let whole = meters.max(0.0).round();
    if whole >= 1000.0 {
        format!("{:.1}km", meters / 1000.0)
    } else {
        format!("{}m", whole as u64)
    }
}

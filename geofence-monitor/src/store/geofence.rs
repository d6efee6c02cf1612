//! Geofence records and their validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};
use crate::geo::{format_distance, Coordinate};

/// A named circular region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    /// Stable unique identifier, assigned by the store.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Center of the circle.
    pub center: Coordinate,
    /// Radius in meters, always positive.
    pub radius_meters: f64,
    /// Inactive geofences are skipped during evaluation.
    pub is_active: bool,
    /// When the geofence was added.
    pub created_at: DateTime<Utc>,
}

impl Geofence {
    /// Human-readable radius (`"500m"`, `"1.5km"`).
    pub fn radius_display(&self) -> String {
        format_distance(self.radius_meters)
    }
}

impl std::fmt::Display for Geofence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" ({}) r={}",
            self.name,
            self.center,
            self.radius_display()
        )
    }
}

/// Caller-supplied parameters for a new geofence.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceDefinition {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

impl GeofenceDefinition {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            radius_meters,
        }
    }

    /// Validate and convert into the stored center coordinate.
    pub(crate) fn validate(&self) -> MonitorResult<Coordinate> {
        validate_name(&self.name)?;
        validate_radius(self.radius_meters)?;
        Coordinate::new(self.latitude, self.longitude)
            .map_err(|e| MonitorError::Validation(e.to_string()))
    }
}

/// Partial update of a geofence. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeofenceUpdate {
    pub name: Option<String>,
    pub radius_meters: Option<f64>,
    pub is_active: Option<bool>,
}

impl GeofenceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = Some(radius_meters);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.radius_meters.is_none() && self.is_active.is_none()
    }

    /// Merge into `geofence`, validating the merged values first.
    ///
    /// On error `geofence` is left untouched.
    pub(crate) fn apply_to(&self, geofence: &mut Geofence) -> MonitorResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(radius) = self.radius_meters {
            validate_radius(radius)?;
        }

        if let Some(name) = &self.name {
            geofence.name = name.trim().to_string();
        }
        if let Some(radius) = self.radius_meters {
            geofence.radius_meters = radius;
        }
        if let Some(is_active) = self.is_active {
            geofence.is_active = is_active;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> MonitorResult<()> {
    if name.trim().is_empty() {
        return Err(MonitorError::Validation(
            "name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_radius(radius_meters: f64) -> MonitorResult<()> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(MonitorError::Validation(format!(
            "radius must be a positive number of meters, got {}",
            radius_meters
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_geofence() -> Geofence {
        Geofence {
            id: "1-0000".to_string(),
            name: "Office".to_string(),
            center: Coordinate::new(37.7749, -122.4194).unwrap(),
            radius_meters: 1000.0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_definition_validates() {
        let def = GeofenceDefinition::new("Home", 37.7749, -122.4194, 250.0);
        let center = def.validate().unwrap();
        assert_eq!(center.latitude, 37.7749);
    }

    #[test]
    fn test_definition_rejects_bad_radius() {
        for radius in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let def = GeofenceDefinition::new("Home", 0.0, 0.0, radius);
            assert!(def.validate().unwrap_err().is_validation());
        }
    }

    #[test]
    fn test_definition_rejects_bad_coordinates() {
        assert!(GeofenceDefinition::new("Home", 91.0, 0.0, 10.0)
            .validate()
            .is_err());
        assert!(GeofenceDefinition::new("Home", 0.0, 181.0, 10.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_definition_rejects_blank_name() {
        let def = GeofenceDefinition::new("   ", 0.0, 0.0, 10.0);
        assert!(def.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_update_merges_fields() {
        let mut geofence = sample_geofence();
        GeofenceUpdate::new()
            .with_name(" Work ")
            .with_radius(50.0)
            .with_active(false)
            .apply_to(&mut geofence)
            .unwrap();

        assert_eq!(geofence.name, "Work");
        assert_eq!(geofence.radius_meters, 50.0);
        assert!(!geofence.is_active);
    }

    #[test]
    fn test_invalid_update_leaves_record_untouched() {
        let mut geofence = sample_geofence();
        let before = geofence.clone();

        let result = GeofenceUpdate::new()
            .with_name("Renamed")
            .with_radius(-1.0)
            .apply_to(&mut geofence);

        assert!(result.is_err());
        assert_eq!(geofence, before);
    }

    #[test]
    fn test_radius_display() {
        let mut geofence = sample_geofence();
        assert_eq!(geofence.radius_display(), "1.0km");
        geofence.radius_meters = 300.0;
        assert_eq!(geofence.radius_display(), "300m");
    }
}

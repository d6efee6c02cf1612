//! Durable storage of geofence definitions.
//!
//! [`GeofenceStore`] owns the collection of geofences. Every mutation is
//! written through to disk before it becomes visible in memory, and then
//! announced on a broadcast channel so running tracking sessions can react
//! (for example by dropping membership state of a removed geofence).
//!
//! # Example
//!
//! ```ignore
//! use geofence_monitor::store::{GeofenceDefinition, GeofenceStore};
//!
//! let store = GeofenceStore::open("/var/lib/geofence-monitor/geofences.json")?;
//! let office = store.add(GeofenceDefinition::new("Office", 37.7749, -122.4194, 1000.0))?;
//! for geofence in store.list() {
//!     println!("{}", geofence);
//! }
//! store.remove(&office.id)?;
//! ```

mod geofence;

pub use geofence::{Geofence, GeofenceDefinition, GeofenceUpdate};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::{MonitorError, MonitorResult};
use crate::ids::IdGenerator;
use crate::persist::{load_json, save_json_atomic};

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A mutation that was committed to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceChange {
    Added(Geofence),
    Updated(Geofence),
    Removed { id: String },
}

/// Durable, ordered collection of geofences.
///
/// Thread-safe: reads take a shared lock, writes hold the exclusive lock
/// across the durable write so concurrent mutations are serialized.
pub struct GeofenceStore {
    path: PathBuf,
    geofences: RwLock<Arc<Vec<Geofence>>>,
    ids: IdGenerator,
    changes: broadcast::Sender<GeofenceChange>,
}

impl std::fmt::Debug for GeofenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceStore")
            .field("path", &self.path)
            .field("count", &self.len())
            .finish_non_exhaustive()
    }
}

impl GeofenceStore {
    /// Open the store backed by `path`, loading any existing geofences.
    pub fn open(path: impl Into<PathBuf>) -> MonitorResult<Self> {
        let path = path.into();
        let geofences: Vec<Geofence> = load_json(&path)?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        debug!(path = %path.display(), count = geofences.len(), "Geofence store opened");

        Ok(Self {
            path,
            geofences: RwLock::new(Arc::new(geofences)),
            ids: IdGenerator::new(),
            changes,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and add a new, active geofence.
    pub fn add(&self, definition: GeofenceDefinition) -> MonitorResult<Geofence> {
        let center = definition.validate()?;

        let mut guard = self.geofences.write();
        let id = self.unused_id(&guard);
        let geofence = Geofence {
            id,
            name: definition.name.trim().to_string(),
            center,
            radius_meters: definition.radius_meters,
            is_active: true,
            created_at: Utc::now(),
        };

        let mut next = guard.as_ref().clone();
        next.push(geofence.clone());
        self.commit(&mut guard, next)?;
        drop(guard);

        info!(id = %geofence.id, name = %geofence.name, "Geofence added");
        self.announce(GeofenceChange::Added(geofence.clone()));
        Ok(geofence)
    }

    /// Remove a geofence, returning the removed record.
    pub fn remove(&self, id: &str) -> MonitorResult<Geofence> {
        let mut guard = self.geofences.write();
        let index = Self::position(&guard, id)?;

        let mut next = guard.as_ref().clone();
        let removed = next.remove(index);
        self.commit(&mut guard, next)?;
        drop(guard);

        info!(id = %removed.id, name = %removed.name, "Geofence removed");
        self.announce(GeofenceChange::Removed {
            id: removed.id.clone(),
        });
        Ok(removed)
    }

    /// Merge `update` into the geofence with the given id.
    ///
    /// Toggling `is_active` only changes whether the geofence is evaluated;
    /// membership state held by running sessions is not reset.
    pub fn update(&self, id: &str, update: GeofenceUpdate) -> MonitorResult<Geofence> {
        let mut guard = self.geofences.write();
        let index = Self::position(&guard, id)?;

        let mut next = guard.as_ref().clone();
        update.apply_to(&mut next[index])?;
        let updated = next[index].clone();
        self.commit(&mut guard, next)?;
        drop(guard);

        info!(
            id = %updated.id,
            name = %updated.name,
            is_active = updated.is_active,
            "Geofence updated"
        );
        self.announce(GeofenceChange::Updated(updated.clone()));
        Ok(updated)
    }

    /// Look up a geofence by id.
    pub fn get(&self, id: &str) -> MonitorResult<Geofence> {
        self.geofences
            .read()
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| MonitorError::NotFound(id.to_string()))
    }

    /// All geofences in creation order.
    pub fn list(&self) -> Vec<Geofence> {
        self.geofences.read().as_ref().clone()
    }

    /// Cheap shared snapshot of the current collection.
    pub fn snapshot(&self) -> Arc<Vec<Geofence>> {
        Arc::clone(&self.geofences.read())
    }

    /// Number of stored geofences.
    pub fn len(&self) -> usize {
        self.geofences.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to committed changes.
    pub fn subscribe(&self) -> broadcast::Receiver<GeofenceChange> {
        self.changes.subscribe()
    }

    fn position(geofences: &[Geofence], id: &str) -> MonitorResult<usize> {
        geofences
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| MonitorError::NotFound(id.to_string()))
    }

    fn unused_id(&self, geofences: &[Geofence]) -> String {
        loop {
            let id = self.ids.next_id();
            if !geofences.iter().any(|g| g.id == id) {
                return id;
            }
        }
    }

    /// Persist `next`, then publish it in memory. Memory is untouched on error.
    fn commit(&self, current: &mut Arc<Vec<Geofence>>, next: Vec<Geofence>) -> MonitorResult<()> {
        save_json_atomic(&self.path, &next)?;
        *current = Arc::new(next);
        Ok(())
    }

    fn announce(&self, change: GeofenceChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

//! Per-session membership state for a changing set of geofences.

use std::collections::HashMap;

use tracing::trace;

use super::evaluator::{evaluate, Crossing, CrossingKind, MembershipState};
use crate::provider::LocationSample;
use crate::store::Geofence;

/// Membership state of every geofence seen by one tracking session.
///
/// Geofences absent from the map are `Unknown`. State survives snapshot
/// refreshes and deactivation; it is dropped only when the geofence leaves
/// the snapshot or is explicitly forgotten.
#[derive(Debug, Default)]
pub struct MembershipTracker {
    states: HashMap<String, MembershipState>,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a geofence id.
    pub fn state(&self, geofence_id: &str) -> MembershipState {
        self.states
            .get(geofence_id)
            .copied()
            .unwrap_or(MembershipState::Unknown)
    }

    /// Number of geofences with a known state.
    pub fn tracked_count(&self) -> usize {
        self.states.len()
    }

    /// Drop state for a removed geofence. Returns whether state existed.
    pub fn forget(&mut self, geofence_id: &str) -> bool {
        self.states.remove(geofence_id).is_some()
    }

    /// Undo a crossing that could not be recorded, so the next sample
    /// detects it again.
    pub fn rollback(&mut self, crossing: &Crossing) {
        let previous = match crossing.kind {
            CrossingKind::Entry => MembershipState::Outside,
            CrossingKind::Exit => MembershipState::Inside,
        };
        self.states.insert(crossing.geofence_id.clone(), previous);
    }

    /// Reset every geofence to `Unknown`.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Evaluate one sample against a geofence snapshot.
    ///
    /// State for ids missing from `geofences` is discarded. Inactive geofences
    /// are skipped and keep their previous state. Crossings are returned in
    /// snapshot order.
    pub fn evaluate(&mut self, geofences: &[Geofence], sample: &LocationSample) -> Vec<Crossing> {
        self.states
            .retain(|id, _| geofences.iter().any(|g| &g.id == id));

        let mut crossings = Vec::new();
        for geofence in geofences.iter().filter(|g| g.is_active) {
            let previous = self.state(&geofence.id);
            let evaluation = evaluate(previous, geofence, sample);

            trace!(
                geofence = %geofence.id,
                ?previous,
                state = ?evaluation.state,
                distance_m = evaluation.distance_meters,
                "Evaluated geofence"
            );

            self.states.insert(geofence.id.clone(), evaluation.state);
            crossings.extend(evaluation.crossing);
        }
        crossings
    }
}

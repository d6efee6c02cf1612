//! Pure membership classification and transition logic.

use serde::{Deserialize, Serialize};

use crate::provider::LocationSample;
use crate::store::Geofence;

/// Membership of the user in one geofence, as tracked by one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MembershipState {
    /// Not yet evaluated in this session.
    #[default]
    Unknown,
    Inside,
    Outside,
}

impl MembershipState {
    pub fn is_known(&self) -> bool {
        !matches!(self, MembershipState::Unknown)
    }
}

/// Direction of a boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingKind {
    Entry,
    Exit,
}

impl std::fmt::Display for CrossingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrossingKind::Entry => write!(f, "entry"),
            CrossingKind::Exit => write!(f, "exit"),
        }
    }
}

/// A detected boundary crossing, before it is recorded as an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub geofence_id: String,
    pub geofence_name: String,
    pub kind: CrossingKind,
    /// Unrounded distance from the sample to the geofence center.
    pub distance_meters: f64,
    pub sample: LocationSample,
}

/// Outcome of evaluating one sample against one geofence.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub state: MembershipState,
    pub distance_meters: f64,
    pub crossing: Option<Crossing>,
}

/// Classify a sample against a geofence. The boundary counts as inside.
pub fn classify(geofence: &Geofence, sample: &LocationSample) -> (MembershipState, f64) {
    let distance = sample.coordinate().distance_to(&geofence.center);
    let state = if distance <= geofence.radius_meters {
        MembershipState::Inside
    } else {
        MembershipState::Outside
    };
    (state, distance)
}

/// Evaluate `sample` against `geofence` given the previous membership.
///
/// | previous | classified | crossing |
/// |----------|------------|----------|
/// | Unknown  | any        | none     |
/// | Inside   | Inside     | none     |
/// | Outside  | Outside    | none     |
/// | Outside  | Inside     | Entry    |
/// | Inside   | Outside    | Exit     |
///
/// Deterministic: the only time involved is the sample's own timestamp.
pub fn evaluate(
    previous: MembershipState,
    geofence: &Geofence,
    sample: &LocationSample,
) -> Evaluation {
    let (state, distance_meters) = classify(geofence, sample);

    let kind = match (previous, state) {
        (MembershipState::Outside, MembershipState::Inside) => Some(CrossingKind::Entry),
        (MembershipState::Inside, MembershipState::Outside) => Some(CrossingKind::Exit),
        _ => None,
    };

    let crossing = kind.map(|kind| Crossing {
        geofence_id: geofence.id.clone(),
        geofence_name: geofence.name.clone(),
        kind,
        distance_meters,
        sample: *sample,
    });

    Evaluation {
        state,
        distance_meters,
        crossing,
    }
}

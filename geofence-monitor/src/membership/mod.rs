//! Membership evaluation.
//!
//! Turns position samples into boundary crossings:
//!
//! - [`evaluate`] is the pure `(previous state, geofence, sample)` step
//! - [`MembershipTracker`] applies it across a geofence snapshot and keeps
//!   the per-geofence state of one tracking session
//!
//! # State Machine
//!
//! ```text
//! Unknown --[any sample]--> Inside | Outside   (silent)
//! Outside --[inside]------> Inside             (Entry)
//! Inside  --[outside]-----> Outside            (Exit)
//! ```
//!
//! Because only `Inside <-> Outside` changes emit, the crossings for a single
//! geofence always alternate between entry and exit.

mod evaluator;
mod tracker;

pub use evaluator::{classify, evaluate, Crossing, CrossingKind, Evaluation, MembershipState};
pub use tracker::MembershipTracker;

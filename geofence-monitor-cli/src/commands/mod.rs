//! CLI command implementations.

pub mod config;
pub mod events;
pub mod geofences;
pub mod status;
pub mod track;

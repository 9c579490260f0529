//! Offline referee for SPECTRE.
//!
//! Deterministic seeded matches for integration-testing the decision
//! engine end to end: full world state, fog-of-war observation
//! extraction, lockstep resolution of both teams' actions.

pub mod engine;
pub mod world_setup;

pub use engine::MatchEngine;
pub use spectre_core as core;
pub use world_setup::SimConfig;

//! Simulation engine for Ravaged Planets.
//!
//! Owns the entity store, runs systems at a fixed tick rate in
//! `ComponentKind` order, and produces `GameStateSnapshot`s for any
//! consumer to read.

pub mod engine;
pub mod entity;
pub mod error;
pub mod players;
pub mod systems;
pub mod templates;

pub use rp_core as core;
pub use engine::{CommandPoster, SimConfig, SimulationEngine};
pub use entity::EntityManager;
pub use error::{SimError, SimResult};

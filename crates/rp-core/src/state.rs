//! Game state snapshot — the complete, read-only view of simulation state
//! published once per tick for any consumer (a renderer, a headless
//! harness, a test) to read without synchronizing against the simulation
//! thread.

use serde::{Deserialize, Serialize};

use crate::enums::GamePhase;
use crate::events::Alert;
use crate::types::{Color, EntityId, PlayerNo, SimTime, Vec3};

/// Complete simulation state as of the end of the most recent tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    /// Entities, sorted by id — the canonical deterministic iteration
    /// order.
    pub entities: Vec<EntitySnapshot>,
    pub players: Vec<PlayerSnapshot>,
    pub alerts: Vec<Alert>,
}

/// A single entity's externally visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub template_name: String,
    pub pos: Vec3,
    pub dir: Vec3,
    pub owner: Option<PlayerNo>,
    pub color: Option<Color>,
    pub selected: bool,
    pub health: Option<f64>,
}

/// A single player's externally visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_no: PlayerNo,
    pub display_name: String,
    pub color: Color,
    pub connected: bool,
    pub ready_to_start: bool,
}

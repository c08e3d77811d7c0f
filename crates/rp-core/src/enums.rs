//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// The fixed taxonomy of component kinds. An entity carries at most one
/// component of each kind. Declaration order here is also the order in
/// which a single entity's components are updated each tick, which matters
/// for determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Position,
    Ownable,
    Selectable,
    Moveable,
    Pathing,
    Orderable,
    Builder,
    Weapon,
    Projectile,
    Damageable,
}

/// All component kinds, in canonical update order.
pub const COMPONENT_KINDS: &[ComponentKind] = &[
    ComponentKind::Position,
    ComponentKind::Ownable,
    ComponentKind::Selectable,
    ComponentKind::Moveable,
    ComponentKind::Pathing,
    ComponentKind::Orderable,
    ComponentKind::Builder,
    ComponentKind::Weapon,
    ComponentKind::Projectile,
    ComponentKind::Damageable,
];

/// Top-level simulation lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Players are joining; map not yet locked in.
    #[default]
    Lobby,
    /// Simulation is advancing turns.
    Active,
    /// Simulation is holding at the current turn.
    Paused,
    /// Simulation has ended (victory, defeat, or host-terminated).
    Ended,
}

/// Distinguishes how a player's commands are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    /// Commands come from local input.
    Local,
    /// Commands arrive over the network from a remote peer.
    Remote,
    /// Commands are produced by an embedded script.
    Ai,
}

/// A projectile's flight model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Continuously re-aims at its target each tick.
    Seeking,
    /// Follows a fixed trajectory set at launch.
    Ballistic,
}

/// Severity of a user-facing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

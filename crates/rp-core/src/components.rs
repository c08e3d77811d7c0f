//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods beyond small,
//! self-contained helpers. Game logic lives in systems, not components.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::orders::Order;
use crate::types::{Color, EntityId, PlayerNo, Vec3};

/// A dynamically-typed scalar attached to an entity's attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    Int(i64),
    Float(f64),
    Text(String),
    Vector(Vec3),
}

/// World position, orientation, and spatial-partition membership.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionComponent {
    pub pos: Vec3,
    pub dir: Vec3,
    pub up: Vec3,
    /// When set, the deferred position resolver snaps `pos.y` to the
    /// terrain height at (pos.x, pos.z) every tick.
    pub sit_on_terrain: bool,
    /// When set, `dir`/`up` are re-derived from the local terrain normal.
    /// Forced on whenever `sit_on_terrain` is set.
    pub orient_to_terrain: bool,
    /// Id of the patch this entity is currently registered in, or `None`
    /// before the first resolve.
    pub patch: Option<u32>,
}

impl Default for PositionComponent {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            dir: Vec3::new(0.0, 0.0, 1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            sit_on_terrain: false,
            orient_to_terrain: false,
            patch: None,
        }
    }
}

impl PositionComponent {
    pub fn set_sit_on_terrain(&mut self, sit_on_terrain: bool) {
        self.sit_on_terrain = sit_on_terrain;
        if sit_on_terrain {
            self.orient_to_terrain = true;
        }
    }
}

/// Steering behavior: speed, turn rate, and current goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveableComponent {
    pub speed: f32,
    pub turn_speed: f32,
    pub avoid_collisions: bool,
    pub goal: Vec3,
}

impl Default for MoveableComponent {
    fn default() -> Self {
        Self {
            speed: 3.0,
            turn_speed: 1.0,
            avoid_collisions: true,
            goal: Vec3::ZERO,
        }
    }
}

/// A polyline returned by the pathfinder worker, consumed waypoint by
/// waypoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathingComponent {
    pub waypoints: Vec<Vec3>,
    pub index: usize,
    /// Set while a request is outstanding with the pathfinder worker.
    pub pending_request: bool,
}

impl PathingComponent {
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }

    pub fn advance(&mut self) -> bool {
        if self.index + 1 < self.waypoints.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn is_following_path(&self) -> bool {
        self.index < self.waypoints.len()
    }
}

/// Queue of orders this entity has been given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderableComponent {
    pub current: Option<Order>,
    pub queue: VecDeque<Order>,
    /// Set once an order-completion `OrderCommand` has been emitted for the
    /// locally owned entity, to avoid re-emitting before it round-trips.
    pub pending: bool,
}

/// In-progress construction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildState {
    pub template_name: String,
    pub time_to_build: f64,
    pub time_remaining: f64,
}

/// Produces new entities on completion of a build order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderComponent {
    pub building: Option<BuildState>,
}

/// Periodically fires projectiles at a tracked target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponComponent {
    pub target: Option<EntityId>,
    pub range: f32,
    pub cooldown_secs: f64,
    pub time_since_fire: f64,
    pub fire_offset: Vec3,
}

impl Default for WeaponComponent {
    fn default() -> Self {
        Self {
            target: None,
            range: 20.0,
            cooldown_secs: crate::constants::WEAPON_FIRE_INTERVAL_SECS,
            time_since_fire: 0.0,
            fire_offset: Vec3::ZERO,
        }
    }
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileComponent {
    pub kind: crate::enums::ProjectileKind,
    pub target: Option<EntityId>,
    pub speed: f32,
    pub damage: f64,
}

/// Health pool and destruction behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageableComponent {
    pub health: f64,
    pub max_health: f64,
    pub explosion_template: Option<String>,
}

impl Default for DamageableComponent {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            explosion_template: None,
        }
    }
}

/// Owning player and faction color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnableComponent {
    pub owner: PlayerNo,
    pub color: Color,
}

/// Selection and hit-testing radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectableComponent {
    pub selection_radius: f32,
    pub selected: bool,
    pub highlight_color: Option<Color>,
}

impl Default for SelectableComponent {
    fn default() -> Self {
        Self {
            selection_radius: 1.0,
            selected: false,
            highlight_color: None,
        }
    }
}

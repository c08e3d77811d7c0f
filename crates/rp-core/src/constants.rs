//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz). The source drives its simulation thread on a
/// 200ms period; 5 Hz matches that while staying an exact divisor of common
/// render rates.
pub const TICK_RATE: u32 = 5;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Default number of turns between a command's post time and its execution
/// time (the "sync delay"). Configurable per game via `JoinResponse`; see
/// `rp_net::packets::JoinResponse`.
pub const DEFAULT_SIMULATION_K: u32 = 2;

// --- World bounds ---

/// Terrain width/length must be multiples of this many vertices.
pub const TERRAIN_GRID_MULTIPLE: u32 = 64;

/// Size of one spatial partition patch, in world units (half a terrain
/// patch).
pub const PATCH_SIZE: f32 = 32.0;

/// Passability threshold: a vertex is passable when the dot product of its
/// normal with the world-up vector exceeds this value.
pub const COLLISION_SLOPE_THRESHOLD: f32 = 0.85;

// --- Entities ---

/// Maximum player number (1..=255; 0 is reserved/unassigned).
pub const MAX_PLAYERS: u8 = 255;

/// Maximum number of entities a single player may create in one game
/// (low 24 bits of the entity id).
pub const MAX_ENTITIES_PER_PLAYER: u32 = crate::types::ENTITY_COUNTER_MASK;

// --- Movement / steering ---

/// Distance within which a Moveable considers itself at its goal.
pub const GOAL_ARRIVAL_DISTANCE: f32 = 0.1;

/// Distance within which an Orderable's MoveOrder is considered complete.
pub const MOVE_ORDER_ARRIVAL_DISTANCE_SQ: f32 = 1.1;

/// Factor used to scale speed/turn-speed down as a Moveable nears its goal.
pub const STEERING_SLOWDOWN_FACTOR: f32 = 0.25;

/// Collision-avoidance lookahead multiplier applied to an obstacle's
/// selection radius.
pub const AVOIDANCE_RADIUS_MULTIPLIER: f32 = 2.0;

/// Distance, scaled by `1 / turn_speed`, within which a Moveable's angular
/// rate is boosted to finish turning onto the goal heading before arrival.
pub const STEERING_NEAR_GOAL_TURN_DISTANCE_FACTOR: f32 = 4.0;

/// Upper bound on the near-goal angular-rate boost, so a Moveable very close
/// to its goal doesn't get an unreasonably large turn rate for one tick (the
/// heading-overshoot clamp in `Moveable::run` still caps it at facing the
/// goal exactly).
pub const STEERING_NEAR_GOAL_ANGULAR_SCALE_CAP: f32 = 8.0;

// --- Pathfinding ---

/// Distance within which a Pathing component advances to its next waypoint.
pub const PATH_WAYPOINT_ARRIVAL_DISTANCE: f32 = 1.0;

/// Diagonal move cost in the pathfinder's 8-connected grid.
pub const PATH_DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Straight (orthogonal) move cost in the pathfinder's grid.
pub const PATH_STRAIGHT_COST: f32 = 1.0;

/// A node is considered "at the goal" once its estimated cost-to-goal is at
/// or below this value.
pub const PATH_GOAL_EPSILON: f32 = 1.0;

// --- Weapons / projectiles ---

/// Default weapon fire cadence, in seconds.
pub const WEAPON_FIRE_INTERVAL_SECS: f64 = 5.0;

/// Radius, in world units, within which an exploding warhead applies
/// falloff damage to nearby damageable entities.
pub const EXPLOSION_DAMAGE_RADIUS: f32 = 5.0;

// --- Networking ---

/// Default UDP listen port.
pub const DEFAULT_LISTEN_PORT: u16 = 9871;

/// Number of fixed color slots available to assign to joining players.
pub const COLOR_PALETTE_SIZE: usize = 8;

// --- Logging ---

/// Number of most-recent log lines kept in memory for user-visible error
/// reports (see `rp_core::logging::MemoryLogLayer`).
pub const MEMORY_LOG_CAPACITY: usize = 500;

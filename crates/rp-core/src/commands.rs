//! Commands: serializable, network-propagated simulation intent.
//!
//! Unlike an `Order`, a `Command` affects shared simulation state directly
//! and is the unit of lockstep synchronization — every peer executes the
//! same commands, in the same order, at the same turn.

use serde::{Deserialize, Serialize};

use crate::orders::Order;
use crate::types::{EntityId, PlayerNo, Vec3};

/// All commands the simulation driver can schedule and execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Create a new entity from a template. `initial_goal` is relative to
    /// `initial_pos` (matching how a builder hands a freshly-built unit an
    /// initial move order), not an absolute world position.
    CreateEntity {
        player_no: PlayerNo,
        new_id: EntityId,
        template_name: String,
        initial_pos: Vec3,
        initial_goal: Vec3,
    },
    /// Install `order` as the target entity's next order.
    Order {
        player_no: PlayerNo,
        target_entity_id: EntityId,
        order: Order,
    },
    /// Admit a newly connected player into the game. Only valid before the
    /// game has started; see `rp_sim::engine::SimulationEngine::tick`.
    ConnectPlayer { player_no: PlayerNo },
}

impl Command {
    /// Stable byte identifier used by the fixed wire encoding (see
    /// `rp_net::codec`).
    pub fn wire_id(&self) -> u8 {
        match self {
            Command::CreateEntity { .. } => 1,
            Command::Order { .. } => 2,
            Command::ConnectPlayer { .. } => 3,
        }
    }

    pub fn player_no(&self) -> PlayerNo {
        match self {
            Command::CreateEntity { player_no, .. } => *player_no,
            Command::Order { player_no, .. } => *player_no,
            Command::ConnectPlayer { player_no } => *player_no,
        }
    }
}

/// Generates the next entity id for `player_no`, given the count of
/// entities that player has already created.
pub fn generate_entity_id(player_no: PlayerNo, next_counter: u32) -> Option<EntityId> {
    EntityId::new(player_no, next_counter)
}

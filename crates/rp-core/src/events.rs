//! Events emitted by the simulation for AI scripts, logging, and any
//! observing harness (a renderer among them, though none is implemented
//! here).

use serde::{Deserialize, Serialize};

use crate::enums::AlertLevel;
use crate::orders::Order;
use crate::types::{EntityId, PlayerNo};

/// A notable occurrence during a tick. AI players subscribe to these by
/// name through `rp_ai`'s scripting bridge; the simulation driver also uses
/// them to drive logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    EntityCreated { id: EntityId, template_name: String },
    EntityDestroyed { id: EntityId },
    OrderCompleted { entity: EntityId, order: Order },
    PlayerJoined { player_no: PlayerNo },
    PlayerDisconnected { player_no: PlayerNo },
}

impl SimEvent {
    /// The name an AI script would `event("name", ...)` subscribe to.
    pub fn name(&self) -> &'static str {
        match self {
            SimEvent::EntityCreated { .. } => "entity_created",
            SimEvent::EntityDestroyed { .. } => "entity_destroyed",
            SimEvent::OrderCompleted { .. } => "order_completed",
            SimEvent::PlayerJoined { .. } => "player_joined",
            SimEvent::PlayerDisconnected { .. } => "player_disconnected",
        }
    }
}

/// A user-visible alert, surfaced by the headless harness's log/snapshot
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub tick: u64,
}

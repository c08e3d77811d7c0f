//! Entity-local orders. An order is installed into an `OrderableComponent`'s
//! queue; it never executes directly — it is always wrapped in an
//! `Order`-carrying `Command::Order` and distributed to every peer so it
//! executes at the same turn everywhere.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Vec3};

/// An order an entity can be carrying out. Tagged internally so the wire
/// encoding and JSON encoding agree on shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Order {
    /// Move to `goal` (toroidal world coordinates).
    Move { goal: Vec3 },
    /// Attack `target` until it or the attacker no longer exists.
    Attack { target: EntityId },
    /// Build the named template; the builder's own `BuilderComponent`
    /// tracks construction progress.
    Build { template_name: String },
}

impl Order {
    /// Stable byte identifier used by the fixed wire encoding (see
    /// `rp_net::codec`).
    pub fn wire_id(&self) -> u8 {
        match self {
            Order::Move { .. } => 1,
            Order::Attack { .. } => 2,
            Order::Build { .. } => 3,
        }
    }
}

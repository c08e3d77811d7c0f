//! Position system: resolves toroidal wrap, terrain snapping/orientation,
//! and patch membership. Runs first each tick so every later system sees an
//! up-to-date `pos`/`dir`/`patch`.

use rp_core::components::PositionComponent;
use rp_core::types::{EntityId, WorldDims};
use rp_world::{PatchManager, Terrain};

use crate::entity::EntityManager;

/// Wraps positions into world bounds, snaps to terrain height/normal where
/// requested, and keeps each entity registered in the patch matching its
/// resolved (x, z).
pub fn run(entities: &mut EntityManager, patches: &mut PatchManager, terrain: Option<&Terrain>, dims: WorldDims) {
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let world = entities.world_mut();

    for (id, entity) in pairs {
        let Ok(mut pos) = world.get::<&mut PositionComponent>(entity) else {
            continue;
        };

        let (wx, wz) = dims.wrap(pos.pos.x, pos.pos.z);
        pos.pos.x = wx;
        pos.pos.z = wz;

        if pos.sit_on_terrain {
            if let Some(terrain) = terrain {
                pos.pos.y = terrain.get_height(wx, wz);
            }
        }
        if pos.orient_to_terrain {
            if let Some(terrain) = terrain {
                pos.up = terrain.get_normal(wx, wz);
            }
        }

        let new_patch_id = patches.get_patch_id(wx, wz);
        if pos.patch != Some(new_patch_id) {
            if let Some(old_id) = pos.patch {
                patches.patch_by_id_mut(old_id).remove_entity(id);
            }
            patches.patch_by_id_mut(new_patch_id).add_entity(id);
            pos.patch = Some(new_patch_id);
        }
    }
}

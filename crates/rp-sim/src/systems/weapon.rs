//! Weapon system: tracks a target in range and fires on cadence.
//!
//! Firing spawns a projectile directly through `EntityManager` rather than
//! posting a `Command` — the firing decision is already a deterministic
//! function of state every peer has already lockstepped (tick count, target
//! position, weapon cooldown), so a network round-trip would only add
//! latency between the decision and its effect, not determinism.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use rp_core::components::{OwnableComponent, PositionComponent, ProjectileComponent, WeaponComponent};
use rp_core::constants::DT;
use rp_core::types::{EntityId, Vec3};

use crate::entity::EntityManager;
use crate::templates::{apply_template, TemplateLibrary};

/// Local bookkeeping component naming the projectile template a weapon
/// instantiates when it fires. Not part of `rp_core::enums::ComponentKind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponLoadout(pub String);

pub fn run(entities: &mut EntityManager, templates: &TemplateLibrary) {
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let by_id: HashMap<EntityId, hecs::Entity> = pairs.iter().copied().collect();

    let mut to_fire = Vec::new();

    {
        let world = entities.world_mut();
        for (id, entity) in pairs.iter().copied() {
            let Ok(mut weapon) = world.get::<&mut WeaponComponent>(entity) else {
                continue;
            };
            let Some(target_id) = weapon.target else { continue };
            let Some(&target_entity) = by_id.get(&target_id) else {
                weapon.target = None;
                continue;
            };

            weapon.time_since_fire += DT;
            if weapon.time_since_fire < weapon.cooldown_secs {
                continue;
            }

            let Ok(pos) = world.get::<&PositionComponent>(entity) else { continue };
            let self_pos = pos.pos.add(&weapon.fire_offset);
            drop(pos);

            let Ok(target_pos) = world.get::<&PositionComponent>(target_entity) else {
                continue;
            };
            let range_sq = weapon.range * weapon.range;
            if self_pos.sub(&target_pos.pos).length_squared() > range_sq {
                continue;
            }

            let Ok(loadout) = world.get::<&WeaponLoadout>(entity) else {
                continue;
            };

            weapon.time_since_fire = 0.0;
            to_fire.push((id, loadout.0.clone(), self_pos, target_id, target_pos.pos));
        }
    }

    for (shooter_id, template_name, spawn_pos, target_id, target_pos) in to_fire {
        fire(entities, templates, shooter_id, &template_name, spawn_pos, target_id, target_pos);
    }
}

fn fire(
    entities: &mut EntityManager,
    templates: &TemplateLibrary,
    shooter_id: EntityId,
    projectile_template: &str,
    spawn_pos: Vec3,
    target_id: EntityId,
    target_pos: Vec3,
) {
    let Some(shooter_entity) = entities.get(shooter_id) else { return };
    let owner = entities
        .world()
        .get::<&OwnableComponent>(shooter_entity)
        .map(|o| o.owner)
        .unwrap_or_default();
    let color = entities
        .world()
        .get::<&OwnableComponent>(shooter_entity)
        .map(|o| o.color)
        .unwrap_or_default();

    let Ok(new_id) = entities.allocate_id(owner) else { return };
    if apply_template(
        entities,
        templates,
        projectile_template,
        new_id,
        owner,
        color,
        spawn_pos,
        Vec3::ZERO,
    )
    .is_err()
    {
        return;
    }

    if let Some(entity) = entities.get(new_id) {
        if let Ok(mut projectile) = entities.world().get::<&mut ProjectileComponent>(entity) {
            projectile.target = Some(target_id);
        }
        if let Ok(mut pos) = entities.world().get::<&mut PositionComponent>(entity) {
            pos.dir = target_pos.sub(&spawn_pos).normalized();
        }
    }
}

//! Damageable system: destroys entities whose health has dropped to zero
//! and detonates their explosion, if they have one.
//!
//! An explosion applies radius damage to every other damageable entity
//! within `EXPLOSION_DAMAGE_RADIUS`, proportional to `radius - distance` —
//! full intensity at zero range, tapering to nothing at the radius edge.

use rp_core::components::{DamageableComponent, PositionComponent};
use rp_core::constants::EXPLOSION_DAMAGE_RADIUS;
use rp_core::types::{EntityId, PlayerNo, Vec3};

use crate::entity::EntityManager;
use crate::templates::{apply_template, TemplateLibrary};

/// Runs the system and returns the ids of entities destroyed this tick (so
/// the engine can turn them into `SimEvent::EntityDestroyed`).
pub fn run(entities: &mut EntityManager, templates: &TemplateLibrary) -> Vec<EntityId> {
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();

    let mut dead = Vec::new();
    {
        let world = entities.world_mut();
        for (id, entity) in pairs.iter().copied() {
            let Ok(damageable) = world.get::<&DamageableComponent>(entity) else {
                continue;
            };
            if damageable.health <= 0.0 {
                let pos = world.get::<&PositionComponent>(entity).map(|p| p.pos).unwrap_or(Vec3::ZERO);
                dead.push((id, damageable.explosion_template.clone(), pos));
            }
        }
    }

    let mut destroyed = Vec::with_capacity(dead.len());
    for (id, explosion_template, pos) in dead {
        if let Some(template_name) = explosion_template {
            spawn_explosion(entities, templates, &template_name, pos);
        }
        apply_radius_damage(entities, pos, id);
        entities.destroy(id);
        destroyed.push(id);
    }
    destroyed
}

fn spawn_explosion(entities: &mut EntityManager, templates: &TemplateLibrary, template_name: &str, pos: Vec3) {
    let Ok(new_id) = entities.allocate_id(PlayerNo::UNASSIGNED) else {
        return;
    };
    let _ = apply_template(
        entities,
        templates,
        template_name,
        new_id,
        PlayerNo::UNASSIGNED,
        Default::default(),
        pos,
        Vec3::ZERO,
    );
}

fn apply_radius_damage(entities: &mut EntityManager, origin: Vec3, exclude: EntityId) {
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let world = entities.world_mut();

    for (id, entity) in pairs {
        if id == exclude {
            continue;
        }
        let Ok(pos) = world.get::<&PositionComponent>(entity) else {
            continue;
        };
        let distance = pos.pos.sub(&origin).length();
        drop(pos);
        if distance >= EXPLOSION_DAMAGE_RADIUS {
            continue;
        }
        let falloff = EXPLOSION_DAMAGE_RADIUS - distance;
        if let Ok(mut damageable) = world.get::<&mut DamageableComponent>(entity) {
            damageable.health -= falloff as f64;
        }
    }
}

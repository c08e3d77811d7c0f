//! Projectile system: advances projectiles in flight and resolves hits.
//!
//! A `Seeking` projectile re-aims at its target's current position every
//! tick; a `Ballistic` one keeps the heading it launched with (set once in
//! `systems::weapon::fire`) regardless of where the target moves. A hit is
//! detected when the projectile's position enters the target's selection
//! radius — the same sphere test used for entity selection, per the
//! project's "projectile hit via selection-radius sphere" invariant.

use std::collections::HashMap;

use rp_core::components::{DamageableComponent, PositionComponent, ProjectileComponent, SelectableComponent};
use rp_core::constants::DT;
use rp_core::enums::ProjectileKind;
use rp_core::types::EntityId;

use crate::entity::EntityManager;

/// A projectile that hit or expired this tick and must be cleaned up, along
/// with the entity (if any) it should damage.
pub struct ProjectileImpact {
    pub projectile_id: EntityId,
    pub target_id: Option<EntityId>,
}

pub fn run(entities: &mut EntityManager) -> Vec<ProjectileImpact> {
    let mut impacts = Vec::new();
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let by_id: HashMap<EntityId, hecs::Entity> = pairs.iter().copied().collect();
    let world = entities.world_mut();

    for (id, entity) in pairs {
        let Ok(projectile) = world.get::<&ProjectileComponent>(entity) else {
            continue;
        };
        let kind = projectile.kind;
        let speed = projectile.speed;
        let target_id = projectile.target;
        drop(projectile);

        let target_entity = target_id.and_then(|t| by_id.get(&t).copied());

        if matches!(kind, ProjectileKind::Seeking) {
            if let Some(target_entity) = target_entity {
                if let Ok(target_pos) = world.get::<&PositionComponent>(target_entity) {
                    let goal = target_pos.pos;
                    drop(target_pos);
                    if let Ok(mut pos) = world.get::<&mut PositionComponent>(entity) {
                        pos.dir = goal.sub(&pos.pos).normalized();
                    }
                }
            }
        }

        let Ok(mut pos) = world.get::<&mut PositionComponent>(entity) else {
            continue;
        };
        let step = pos.dir.scale(speed * DT as f32);
        pos.pos = pos.pos.add(&step);
        let self_pos = pos.pos;
        drop(pos);

        if let Some(target_entity) = target_entity {
            let hit = world
                .get::<(&PositionComponent, &SelectableComponent)>(target_entity)
                .map(|(target_pos, selectable)| {
                    self_pos.sub(&target_pos.pos).length() <= selectable.selection_radius
                })
                .unwrap_or(false);
            if hit {
                impacts.push(ProjectileImpact { projectile_id: id, target_id });
            }
        }
    }

    impacts
}

/// Applies a projectile's damage to its target (if still alive) and queues
/// the projectile for destruction, returning the destroyed projectile ids.
/// A lethal hit does not destroy the target directly — `systems::damageable`
/// is what reacts to health dropping to zero, later in the same tick.
pub fn resolve_impacts(entities: &mut EntityManager, impacts: Vec<ProjectileImpact>) -> Vec<EntityId> {
    let mut destroyed = Vec::with_capacity(impacts.len());
    for impact in impacts {
        let Some(projectile_entity) = entities.get(impact.projectile_id) else {
            continue;
        };
        let damage = entities
            .world()
            .get::<&ProjectileComponent>(projectile_entity)
            .map(|p| p.damage)
            .unwrap_or(0.0);

        if let Some(target_id) = impact.target_id {
            if let Some(target_entity) = entities.get(target_id) {
                if let Ok(mut damageable) = entities.world().get::<&mut DamageableComponent>(target_entity) {
                    damageable.health -= damage;
                }
            }
        }

        entities.destroy(impact.projectile_id);
        destroyed.push(impact.projectile_id);
    }
    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::types::{PlayerNo, Vec3};

    #[test]
    fn test_ballistic_projectile_holds_fixed_heading() {
        let mut entities = EntityManager::new();
        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::ZERO,
                dir: Vec3::new(1.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            ProjectileComponent {
                kind: ProjectileKind::Ballistic,
                target: None,
                speed: 10.0,
                damage: 5.0,
            },
        ));
        entities.register(id, entity);

        run(&mut entities);

        let entity = entities.get(id).unwrap();
        let pos = entities.world().get::<&PositionComponent>(entity).unwrap();
        assert!(pos.pos.x > 0.0);
        assert_eq!(pos.dir, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_seeking_projectile_hits_target_in_selection_radius() {
        let mut entities = EntityManager::new();

        let target_id = entities.allocate_id(PlayerNo(2)).unwrap();
        let target = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(0.5, 0.0, 0.0),
                ..PositionComponent::default()
            },
            SelectableComponent { selection_radius: 1.0, ..SelectableComponent::default() },
            DamageableComponent::default(),
        ));
        entities.register(target_id, target);

        let projectile_id = entities.allocate_id(PlayerNo(1)).unwrap();
        let projectile = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::ZERO,
                dir: Vec3::new(1.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            ProjectileComponent {
                kind: ProjectileKind::Seeking,
                target: Some(target_id),
                speed: 100.0,
                damage: 25.0,
            },
        ));
        entities.register(projectile_id, projectile);

        let impacts = run(&mut entities);
        assert_eq!(impacts.len(), 1);

        let destroyed = resolve_impacts(&mut entities, impacts);
        assert_eq!(destroyed, vec![projectile_id]);
        assert!(entities.get(projectile_id).is_some(), "destroy is deferred");
        entities.flush_destroyed();
        assert!(entities.get(projectile_id).is_none());

        let target_entity = entities.get(target_id).unwrap();
        let damageable = entities.world().get::<&DamageableComponent>(target_entity).unwrap();
        assert_eq!(damageable.health, 75.0);
    }
}

//! Builder system: advances in-progress construction and, on completion,
//! produces a `Command::CreateEntity` for the caller to post through the
//! lockstep pipeline.
//!
//! Entity-id allocation authority belongs solely to the owning player, so
//! unlike a weapon's projectile spawn (handled directly by
//! `systems::weapon`, since firing is already a deterministic function of
//! already-lockstepped state) a build completion must round-trip through a
//! posted command so every peer assigns the identical id.

use rp_core::commands::Command;
use rp_core::components::{BuilderComponent, OwnableComponent, PositionComponent};
use rp_core::constants::DT;
use rp_core::types::{EntityId, Vec3};

use crate::entity::EntityManager;

/// A build that finished this tick, named so the caller can allocate its id
/// and issue the `Command::CreateEntity`.
pub struct CompletedBuild {
    pub builder_id: EntityId,
    pub template_name: String,
    pub spawn_pos: Vec3,
}

pub fn run(entities: &mut EntityManager) -> Vec<CompletedBuild> {
    let mut completed = Vec::new();
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let world = entities.world_mut();

    for (id, entity) in pairs {
        let Ok(mut builder) = world.get::<&mut BuilderComponent>(entity) else {
            continue;
        };
        let Some(state) = builder.building.as_mut() else {
            continue;
        };

        state.time_remaining -= DT;
        if state.time_remaining > 0.0 {
            continue;
        }

        let template_name = state.template_name.clone();
        builder.building = None;
        drop(builder);

        let spawn_pos = world.get::<&PositionComponent>(entity).map(|p| p.pos).unwrap_or(Vec3::ZERO);
        completed.push(CompletedBuild { builder_id: id, template_name, spawn_pos });
    }

    completed
}

/// Turns a completed build into the `Command::CreateEntity` its owning
/// player should post, allocating the new entity's id from that player's
/// counter.
pub fn completed_build_to_command(
    entities: &mut EntityManager,
    completed: CompletedBuild,
) -> Option<Command> {
    let builder_entity = entities.get(completed.builder_id)?;
    let owner = entities
        .world()
        .get::<&OwnableComponent>(builder_entity)
        .map(|o| o.owner)
        .ok()?;
    let new_id = entities.allocate_id(owner).ok()?;
    Some(Command::CreateEntity {
        player_no: owner,
        new_id,
        template_name: completed.template_name,
        initial_pos: completed.spawn_pos,
        initial_goal: Vec3::ZERO,
    })
}

//! Orderable system: installs the next queued order as `current`, applies
//! its starting effects on other components, and retires it once
//! `is_complete` says so.
//!
//! Order completion for a locally or AI-owned entity is reported back as a
//! `SimEvent::OrderCompleted` in the returned list; the caller
//! (`SimulationEngine`) decides what, if anything, to broadcast about it.

use std::collections::HashSet;

use rp_core::components::{
    BuildState, BuilderComponent, MoveableComponent, OrderableComponent, PositionComponent, WeaponComponent,
};
use rp_core::constants::MOVE_ORDER_ARRIVAL_DISTANCE_SQ;
use rp_core::events::SimEvent;
use rp_core::orders::Order;
use rp_core::types::{EntityId, WorldDims};
use rp_world::direction_to;

use crate::entity::EntityManager;
use crate::templates::TemplateLibrary;

pub fn run(entities: &mut EntityManager, templates: &TemplateLibrary, dims: WorldDims) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let alive: HashSet<EntityId> = pairs.iter().map(|(id, _)| *id).collect();
    let world = entities.world_mut();

    for (id, entity) in pairs {
        let Ok(mut orderable) = world.get::<&mut OrderableComponent>(entity) else {
            continue;
        };

        if orderable.current.is_none() {
            if let Some(next) = orderable.queue.pop_front() {
                orderable.current = Some(next);
                let order = orderable.current.clone().unwrap();
                drop(orderable);
                begin_order(world, entity, &order, templates);
                orderable = world.get::<&mut OrderableComponent>(entity).unwrap();
            }
        }

        let Some(order) = orderable.current.clone() else {
            continue;
        };
        drop(orderable);

        if is_complete(world, entity, &order, dims, &alive) {
            let mut orderable = world.get::<&mut OrderableComponent>(entity).unwrap();
            orderable.current = None;
            events.push(SimEvent::OrderCompleted { entity: id, order });
        }
    }

    events
}

fn begin_order(world: &mut hecs::World, entity: hecs::Entity, order: &Order, templates: &TemplateLibrary) {
    match order {
        Order::Move { goal } => {
            if let Ok(mut moveable) = world.get::<&mut MoveableComponent>(entity) {
                moveable.goal = *goal;
            }
        }
        Order::Attack { target } => {
            if let Ok(mut weapon) = world.get::<&mut WeaponComponent>(entity) {
                weapon.target = Some(*target);
            }
        }
        Order::Build { template_name } => {
            if let Ok(mut builder) = world.get::<&mut BuilderComponent>(entity) {
                let time_to_build = build_time_for(templates, template_name);
                builder.building = Some(BuildState {
                    template_name: template_name.clone(),
                    time_to_build,
                    time_remaining: time_to_build,
                });
            }
        }
    }
}

fn build_time_for(templates: &TemplateLibrary, template_name: &str) -> f64 {
    templates
        .get(template_name)
        .and_then(|t| t.attributes.get("build_time_secs"))
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
        .unwrap_or(10.0)
}

fn is_complete(
    world: &hecs::World,
    entity: hecs::Entity,
    order: &Order,
    dims: WorldDims,
    alive: &HashSet<EntityId>,
) -> bool {
    match order {
        Order::Move { goal } => {
            let Ok(pos) = world.get::<&PositionComponent>(entity) else {
                return true;
            };
            let to_goal = direction_to(pos.pos, *goal, dims, true);
            to_goal.length_squared() <= MOVE_ORDER_ARRIVAL_DISTANCE_SQ
        }
        Order::Attack { target } => !alive.contains(target),
        Order::Build { .. } => {
            let Ok(builder) = world.get::<&BuilderComponent>(entity) else {
                return true;
            };
            builder.building.is_none()
        }
    }
}

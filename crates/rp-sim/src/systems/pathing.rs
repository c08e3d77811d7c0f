//! Pathing system: drives a `PathingComponent` toward its next waypoint and
//! issues a request to the pathfinder worker when one is needed but not yet
//! outstanding.
//!
//! The worker's callback runs on the pathfinder thread, so the result is
//! handed back through a thread-safe slot (`PathResultSlot`) that this
//! system polls once per tick rather than being called back into directly.

use std::sync::{Arc, Mutex};

use rp_core::components::{MoveableComponent, PathingComponent, PositionComponent};
use rp_core::constants::PATH_WAYPOINT_ARRIVAL_DISTANCE;
use rp_core::types::{EntityId, Vec3};
use rp_pathfinding::PathWorker;

use crate::entity::EntityManager;

/// Thread-safe inbox for one entity's outstanding path request: `None` while
/// no result has arrived yet, `Some(waypoints)` once the worker replies
/// (an empty vec means the goal was unreachable, per the worker's contract —
/// not an error).
#[derive(Default)]
pub struct PathResultSlot(Arc<Mutex<Option<Vec<Vec3>>>>);

impl PathResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Option<Vec<Vec3>> {
        self.0.lock().expect("path result mutex poisoned").take()
    }

    fn sender(&self) -> Arc<Mutex<Option<Vec<Vec3>>>> {
        Arc::clone(&self.0)
    }
}

/// Polls outstanding path-request slots, installs completed paths, advances
/// waypoints the entity has reached, and issues new path requests for
/// Moveables whose `PathingComponent` is empty and idle.
pub fn run(
    entities: &mut EntityManager,
    worker: &PathWorker,
    slots: &mut std::collections::HashMap<EntityId, PathResultSlot>,
) {
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let world = entities.world_mut();

    for (id, entity) in pairs {
        let Ok(mut pathing) = world.get::<&mut PathingComponent>(entity) else {
            continue;
        };

        if pathing.pending_request {
            if let Some(slot) = slots.get(&id) {
                if let Some(waypoints) = slot.take() {
                    pathing.waypoints = waypoints;
                    pathing.index = 0;
                    pathing.pending_request = false;
                    slots.remove(&id);
                }
            }
            continue;
        }

        if pathing.is_following_path() {
            if let Some(waypoint) = pathing.current_waypoint() {
                if let Ok(pos) = world.get::<&PositionComponent>(entity) {
                    let dist = pos.pos.sub(&waypoint).length();
                    if dist <= PATH_WAYPOINT_ARRIVAL_DISTANCE {
                        drop(pos);
                        pathing.advance();
                    }
                }
            }
            // Whether or not this tick advanced, steer at the (possibly new)
            // current waypoint rather than the order's final destination.
            if let Some(waypoint) = pathing.current_waypoint() {
                if let Ok(mut moveable) = world.get::<&mut MoveableComponent>(entity) {
                    moveable.goal = waypoint;
                }
            }
            continue;
        }

        // No path and no request outstanding: if this entity is a Moveable
        // with a goal that differs from its current position, kick off a
        // fresh request.
        let Ok(moveable) = world.get::<&MoveableComponent>(entity) else {
            continue;
        };
        let Ok(pos) = world.get::<&PositionComponent>(entity) else {
            continue;
        };
        if pos.pos.sub(&moveable.goal).length() <= PATH_WAYPOINT_ARRIVAL_DISTANCE {
            continue;
        }

        let slot = slots.entry(id).or_insert_with(PathResultSlot::new);
        let target = slot.sender();
        let start = (pos.pos.x, pos.pos.z);
        let goal = (moveable.goal.x, moveable.goal.z);
        drop(moveable);
        drop(pos);

        if worker
            .request(start, goal, move |path| {
                let waypoints = path
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(x, z)| Vec3::new(x, 0.0, z))
                    .collect();
                *target.lock().expect("path result mutex poisoned") = Some(waypoints);
            })
            .is_ok()
        {
            pathing.pending_request = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_world::CollisionBitmap;
    use std::collections::HashMap;
    use std::time::{Duration, Instant};

    use rp_core::types::PlayerNo;

    #[test]
    fn test_pathing_requests_then_installs_path() {
        let mut entities = EntityManager::new();
        let worker = PathWorker::spawn(CollisionBitmap::all_passable(16, 16));
        let mut slots: HashMap<EntityId, PathResultSlot> = HashMap::new();

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(0.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                goal: Vec3::new(5.0, 0.0, 5.0),
                ..MoveableComponent::default()
            },
            PathingComponent::default(),
        ));
        entities.register(id, entity);

        run(&mut entities, &worker, &mut slots);
        {
            let entity = entities.get(id).unwrap();
            let pathing = entities.world().get::<&PathingComponent>(entity).unwrap();
            assert!(pathing.pending_request);
        }

        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            run(&mut entities, &worker, &mut slots);
            let entity = entities.get(id).unwrap();
            let pathing = entities.world().get::<&PathingComponent>(entity).unwrap();
            if pathing.is_following_path() || !pathing.pending_request {
                break;
            }
            assert!(Instant::now() < deadline, "path never arrived");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_pathing_steers_toward_current_waypoint_not_final_goal() {
        let mut entities = EntityManager::new();
        let worker = PathWorker::spawn(CollisionBitmap::all_passable(16, 16));
        let mut slots: HashMap<EntityId, PathResultSlot> = HashMap::new();

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(0.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                goal: Vec3::new(10.0, 0.0, 10.0),
                ..MoveableComponent::default()
            },
            PathingComponent {
                waypoints: vec![Vec3::new(3.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 10.0)],
                index: 0,
                pending_request: false,
            },
        ));
        entities.register(id, entity);

        run(&mut entities, &worker, &mut slots);

        let entity = entities.get(id).unwrap();
        let moveable = entities.world().get::<&MoveableComponent>(entity).unwrap();
        assert_eq!(moveable.goal, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_pathing_advances_goal_to_next_waypoint_on_arrival() {
        let mut entities = EntityManager::new();
        let worker = PathWorker::spawn(CollisionBitmap::all_passable(16, 16));
        let mut slots: HashMap<EntityId, PathResultSlot> = HashMap::new();

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(3.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                goal: Vec3::new(10.0, 0.0, 10.0),
                ..MoveableComponent::default()
            },
            PathingComponent {
                waypoints: vec![Vec3::new(3.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 10.0)],
                index: 0,
                pending_request: false,
            },
        ));
        entities.register(id, entity);

        run(&mut entities, &worker, &mut slots);

        let entity = entities.get(id).unwrap();
        let pathing = entities.world().get::<&PathingComponent>(entity).unwrap();
        assert_eq!(pathing.index, 1);
        let moveable = entities.world().get::<&MoveableComponent>(entity).unwrap();
        assert_eq!(moveable.goal, Vec3::new(10.0, 0.0, 10.0));
    }
}

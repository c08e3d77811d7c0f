//! Moveable system: rotates each Moveable's heading toward its `goal` at its
//! configured turn rate, steps it forward along that heading, slowing as it
//! arrives and swerving around nearby obstacles that lie ahead of it.

use rp_core::components::{MoveableComponent, PositionComponent, SelectableComponent};
use rp_core::constants::{
    AVOIDANCE_RADIUS_MULTIPLIER, GOAL_ARRIVAL_DISTANCE, STEERING_NEAR_GOAL_ANGULAR_SCALE_CAP,
    STEERING_NEAR_GOAL_TURN_DISTANCE_FACTOR, STEERING_SLOWDOWN_FACTOR,
};
use rp_core::types::{EntityId, Vec3, WorldDims};
use rp_world::direction_to;

use crate::entity::EntityManager;

pub fn run(entities: &mut EntityManager, dims: WorldDims, dt: f64) {
    let pairs: Vec<(EntityId, hecs::Entity)> = entities.ids_in_order().collect();
    let world = entities.world_mut();

    for (_id, entity) in pairs.iter().copied() {
        let Ok(pos_snapshot) = world.get::<&PositionComponent>(entity).map(|p| *p) else {
            continue;
        };
        let Ok(mut moveable) = world.get::<&mut MoveableComponent>(entity) else {
            continue;
        };

        let to_goal = direction_to(pos_snapshot.pos, moveable.goal, dims, true);
        let dist = to_goal.length();
        if dist <= GOAL_ARRIVAL_DISTANCE {
            continue;
        }

        let mut desired_dir = to_goal.normalized();

        if moveable.avoid_collisions {
            let forward = current_heading(pos_snapshot.dir, desired_dir);
            if let Some(avoid) =
                nearest_obstacle_avoidance(world, entity, pos_snapshot.pos, forward, moveable.speed)
            {
                desired_dir = desired_dir.add(&avoid).normalized();
            }
        }

        let current_dir = current_heading(pos_snapshot.dir, desired_dir);

        let near_goal_radius = if moveable.turn_speed > f32::EPSILON {
            moveable.turn_speed.recip() * STEERING_NEAR_GOAL_TURN_DISTANCE_FACTOR
        } else {
            0.0
        };
        let angular_scale = if near_goal_radius > f32::EPSILON && dist < near_goal_radius {
            (near_goal_radius / dist.max(GOAL_ARRIVAL_DISTANCE)).min(STEERING_NEAR_GOAL_ANGULAR_SCALE_CAP)
        } else {
            1.0
        };
        let max_turn = moveable.turn_speed * angular_scale * dt as f32;
        let travel_dir = steer_heading(current_dir, desired_dir, max_turn);

        let slow_zone = moveable.speed as f64 * dt * 2.0;
        let speed = if (dist as f64) < slow_zone {
            moveable.speed * STEERING_SLOWDOWN_FACTOR
        } else {
            moveable.speed
        };

        let step = travel_dir.scale(speed * dt as f32);
        let step = if step.length() > dist { travel_dir.scale(dist) } else { step };

        drop(moveable);
        if let Ok(mut pos) = world.get::<&mut PositionComponent>(entity) {
            pos.pos = pos.pos.add(&step);
            pos.dir = travel_dir;
        }
    }
}

/// The heading to steer from: the entity's current facing, or (if it has
/// none yet, e.g. a freshly spawned entity) the direction it's about to
/// steer toward, so the first tick doesn't spuriously "turn" from zero.
fn current_heading(dir: Vec3, fallback: Vec3) -> Vec3 {
    if dir.length_squared() > f32::EPSILON {
        dir.normalized()
    } else {
        fallback
    }
}

/// Rotates a heading confined to the x/z plane around the vertical axis by
/// `angle` radians.
fn rotate_heading(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// A vector 90 degrees from `v` in the x/z plane, used to tell which side of
/// `v` another direction falls on.
fn rotated_90(v: Vec3) -> Vec3 {
    Vec3::new(-v.z, v.y, v.x)
}

/// Rotates `current` toward `desired` by at most `max_angle` radians,
/// clamped so it cannot turn past facing `desired` in a single tick: a
/// 90°-rotated copy of the heading is dotted against `desired` before and
/// after the candidate rotation, and if that dot product's sign flips, the
/// rotation overshot and the heading snaps to `desired` instead.
fn steer_heading(current: Vec3, desired: Vec3, max_angle: f32) -> Vec3 {
    if max_angle <= 0.0 {
        return current;
    }

    let cross_y = current.cross(&desired).y;
    let turn_sign = if cross_y > f32::EPSILON {
        -1.0
    } else if cross_y < -f32::EPSILON {
        1.0
    } else if current.dot(&desired) >= 0.0 {
        return desired; // already facing the goal direction
    } else {
        1.0 // exactly opposite; turn direction is arbitrary
    };

    let candidate = rotate_heading(current, turn_sign * max_angle);

    let side_before = rotated_90(current).dot(&desired);
    let side_after = rotated_90(candidate).dot(&desired);
    if side_before.signum() != side_after.signum() {
        desired
    } else {
        candidate
    }
}

/// Looks at entities sharing the current patch for a nearby `Selectable`
/// obstacle ahead of `forward` and returns a lateral avoidance nudge, or
/// `None` if the path is clear.
fn nearest_obstacle_avoidance(
    world: &hecs::World,
    self_entity: hecs::Entity,
    self_pos: Vec3,
    forward: Vec3,
    speed: f32,
) -> Option<Vec3> {
    let lookahead = speed * AVOIDANCE_RADIUS_MULTIPLIER;
    let mut nudge: Option<Vec3> = None;
    let mut best_dist = lookahead;

    for (other_entity, (other_pos, selectable)) in
        world.query::<(&PositionComponent, &SelectableComponent)>().iter()
    {
        if other_entity == self_entity {
            continue;
        }
        let offset = other_pos.pos.sub(&self_pos);
        let d = offset.length();
        if d <= 0.001 || d >= best_dist {
            continue;
        }
        let obstacle_dir = offset.scale(1.0 / d);
        if forward.dot(&obstacle_dir) <= 0.0 {
            continue; // behind (or level with) the entity; don't deflect for it
        }
        let radius = selectable.selection_radius * AVOIDANCE_RADIUS_MULTIPLIER;
        if d >= radius {
            continue;
        }
        best_dist = d;
        let side = forward.cross(&obstacle_dir);
        let side = if side.length_squared() < 0.01 * 0.01 {
            // Obstacle dead ahead: cross product is degenerate, so pick a
            // fixed-handed perpendicular to swerve around it consistently.
            rotated_90(forward)
        } else {
            side
        };
        nudge = Some(side.normalized().scale(radius - d));
    }

    nudge
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::types::PlayerNo;

    #[test]
    fn test_moveable_steps_toward_goal() {
        let mut entities = EntityManager::new();
        let dims = WorldDims::new(64.0, 64.0);

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(0.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                speed: 5.0,
                goal: Vec3::new(10.0, 0.0, 0.0),
                avoid_collisions: false,
                ..MoveableComponent::default()
            },
        ));
        entities.register(id, entity);

        run(&mut entities, dims, 0.2);

        let entity = entities.get(id).unwrap();
        let pos = entities.world().get::<&PositionComponent>(entity).unwrap();
        assert!(pos.pos.x > 0.0);
        assert!(pos.pos.x <= 10.0);
    }

    #[test]
    fn test_moveable_stops_at_goal() {
        let mut entities = EntityManager::new();
        let dims = WorldDims::new(64.0, 64.0);

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(10.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                speed: 5.0,
                goal: Vec3::new(10.0, 0.0, 0.0),
                avoid_collisions: false,
                ..MoveableComponent::default()
            },
        ));
        entities.register(id, entity);

        run(&mut entities, dims, 0.2);

        let entity = entities.get(id).unwrap();
        let pos = entities.world().get::<&PositionComponent>(entity).unwrap();
        assert!((pos.pos.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_moveable_turn_rate_limits_heading_change_per_tick() {
        let mut entities = EntityManager::new();
        let dims = WorldDims::new(64.0, 64.0);

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(0.0, 0.0, 0.0),
                dir: Vec3::new(0.0, 0.0, 1.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                speed: 5.0,
                turn_speed: 0.5,
                goal: Vec3::new(10.0, 0.0, 0.0),
                avoid_collisions: false,
            },
        ));
        entities.register(id, entity);

        run(&mut entities, dims, 0.1);

        let entity = entities.get(id).unwrap();
        let pos = entities.world().get::<&PositionComponent>(entity).unwrap();
        // Turning at 0.5 rad/s for 0.1s rotates the heading by 0.05 rad from
        // straight-ahead (+z); it should not have snapped to facing the goal
        // (+x) in one tick.
        let angle_from_goal = pos.dir.dot(&Vec3::new(1.0, 0.0, 0.0)).acos();
        assert!(angle_from_goal > 1.4, "heading turned too far in one tick: {angle_from_goal}");
    }

    #[test]
    fn test_moveable_ignores_obstacle_behind_it() {
        let mut entities = EntityManager::new();
        let dims = WorldDims::new(64.0, 64.0);

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(0.0, 0.0, 0.0),
                dir: Vec3::new(1.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                speed: 5.0,
                turn_speed: 4.0,
                goal: Vec3::new(10.0, 0.0, 0.0),
                avoid_collisions: true,
            },
        ));
        entities.register(id, entity);

        let other = entities.allocate_id(PlayerNo(1)).unwrap();
        let other_entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(-0.5, 0.0, 0.0),
                ..PositionComponent::default()
            },
            SelectableComponent {
                selection_radius: 2.0,
                ..SelectableComponent::default()
            },
        ));
        entities.register(other, other_entity);

        run(&mut entities, dims, 0.2);

        let entity = entities.get(id).unwrap();
        let pos = entities.world().get::<&PositionComponent>(entity).unwrap();
        // The obstacle sits directly behind the entity's heading, so it must
        // not deflect the path at all: the entity keeps heading straight at
        // its goal along +x, with z unperturbed.
        assert!((pos.pos.z).abs() < 1e-4, "obstacle behind the entity deflected it: {pos:?}");
    }

    #[test]
    fn test_moveable_swerves_around_obstacle_ahead() {
        let mut entities = EntityManager::new();
        let dims = WorldDims::new(64.0, 64.0);

        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(0.0, 0.0, 0.0),
                dir: Vec3::new(1.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            MoveableComponent {
                speed: 5.0,
                turn_speed: 4.0,
                goal: Vec3::new(10.0, 0.0, 0.0),
                avoid_collisions: true,
            },
        ));
        entities.register(id, entity);

        let other = entities.allocate_id(PlayerNo(1)).unwrap();
        let other_entity = entities.world_mut().spawn((
            PositionComponent {
                pos: Vec3::new(1.0, 0.0, 0.0),
                ..PositionComponent::default()
            },
            SelectableComponent {
                selection_radius: 2.0,
                ..SelectableComponent::default()
            },
        ));
        entities.register(other, other_entity);

        run(&mut entities, dims, 0.2);

        let entity = entities.get(id).unwrap();
        let pos = entities.world().get::<&PositionComponent>(entity).unwrap();
        // An obstacle directly ahead and dead-centered on the goal direction
        // must deflect the path laterally (the 0.01-collinearity fallback).
        assert!(pos.pos.z.abs() > 1e-4, "obstacle ahead failed to deflect the path: {pos:?}");
    }
}

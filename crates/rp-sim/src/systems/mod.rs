//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut EntityManager` (or `&EntityManager`
//! for read-only) and run in `ComponentKind` order: `position`, `moveable`,
//! `pathing`, `orderable`, `builder`, `weapon`, `projectile`, `damageable`,
//! then `cleanup` flushes deferred destruction and `snapshot` renders the
//! tick's `GameStateSnapshot`.

pub mod builder;
pub mod cleanup;
pub mod damageable;
pub mod moveable;
pub mod orderable;
pub mod pathing;
pub mod position;
pub mod projectile;
pub mod snapshot;
pub mod weapon;

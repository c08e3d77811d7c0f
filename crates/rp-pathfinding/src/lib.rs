//! Grid pathfinding over the world's collision bitmap: an A* search reused
//! across requests without reallocation, plus a worker thread so callers
//! never block waiting for a route.

pub mod astar;
pub mod error;
pub mod worker;

pub use astar::PathFinder;
pub use error::{PathError, PathResult};
pub use worker::PathWorker;

//! Error type for the pathfinding crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("pathfinder worker is not running")]
    WorkerStopped,
    #[error("request queue is full")]
    QueueFull,
}

pub type PathResult<T> = Result<T, PathError>;

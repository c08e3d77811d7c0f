//! Shared error taxonomy. Every crate in the workspace maps its own error
//! enum onto these kinds at its boundary, so the simulation driver can
//! react uniformly (log-and-drop, disconnect, or abort) regardless of
//! which subsystem raised it.

use thiserror::Error;

/// A simulation-wide error kind. Subsystem crates (`rp_world`, `rp_net`,
/// `rp_session`, `rp_pathfinding`) define their own `#[derive(Error)]`
/// enums and convert into this one at crate boundaries via `From`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("script error: {0}")]
    ScriptError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

//! Simulation-subsystem error kinds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed template: {0}")]
    Parse(String),

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<SimError> for rp_core::error::CoreError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Io(e) => rp_core::error::CoreError::Io(e),
            SimError::Parse(m) => rp_core::error::CoreError::Parse(m),
            SimError::NotFound(m) => rp_core::error::CoreError::NotFound(m),
            SimError::Invariant(m) => rp_core::error::CoreError::Invariant(m),
        }
    }
}

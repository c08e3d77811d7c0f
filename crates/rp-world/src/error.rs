//! World-subsystem error kinds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed world file: {0}")]
    Parse(String),

    #[error("dimension mismatch: {0}")]
    Invariant(String),
}

pub type WorldResult<T> = Result<T, WorldError>;

impl From<WorldError> for rp_core::error::CoreError {
    fn from(e: WorldError) -> Self {
        match e {
            WorldError::Io(e) => rp_core::error::CoreError::Io(e),
            WorldError::Parse(m) => rp_core::error::CoreError::Parse(m),
            WorldError::Invariant(m) => rp_core::error::CoreError::Invariant(m),
        }
    }
}

//! AI-subsystem error kinds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("script failed to parse: {0}")]
    Parse(String),

    #[error("script raised an error: {0}")]
    Script(String),
}

pub type AiResult<T> = Result<T, AiError>;

impl From<AiError> for rp_core::error::CoreError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Parse(m) => rp_core::error::CoreError::Parse(m),
            AiError::Script(m) => rp_core::error::CoreError::ScriptError(m),
        }
    }
}

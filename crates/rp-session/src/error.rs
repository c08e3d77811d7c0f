//! Error type for the rendezvous session crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("malformed rendezvous response: {0}")]
    Xml(String),
    #[error("rendezvous server reported an error: {0}")]
    Protocol(String),
    #[error("session is not in a state that allows this call (currently {0:?})")]
    WrongState(crate::state::SessionState),
}

pub type SessionResult<T> = Result<T, SessionError>;

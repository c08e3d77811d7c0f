//! The rendezvous/session client: a small synchronous HTTP client for the
//! login/lobby/confirm-player protocol peers use to find each other before
//! falling back to direct peer connections.

pub mod client;
pub mod error;
pub mod state;
pub mod xml;

pub use client::RendezvousClient;
pub use error::{SessionError, SessionResult};
pub use state::SessionState;

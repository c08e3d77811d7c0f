//! Scripted AI players: compiles and drives a per-player script that watches
//! the simulation and issues orders through the same command channel a human
//! player's client uses.

pub mod error;
pub mod host;

pub use error::{AiError, AiResult};
pub use host::ScriptHost;

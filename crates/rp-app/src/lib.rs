//! Headless driver for Ravaged Planets: wires every simulation crate
//! together into a runnable, non-graphical harness.
//!
//! There is no rendering or GUI layer in this scope; the "front end" this
//! crate talks to is whatever calls into `commands` — a CLI, a test, or a
//! future network-facing service. The game loop itself (`game_loop`) plays
//! the role the render thread would in a full client: it's the one
//! consumer of each tick's published snapshot.

pub mod commands;
pub mod game_loop;
pub mod state;

pub use rp_core as core;

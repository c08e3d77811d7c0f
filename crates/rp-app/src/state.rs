//! Shared state handed to the thread running the simulation and to whatever
//! drives it from the outside (the CLI harness, or a test).

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use rp_core::commands::Command;
use rp_core::state::GameStateSnapshot;

/// Messages sent from the driving side to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A command to forward to the simulation engine's post queue.
    Post(Command),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handle to a running game loop thread.
///
/// Mirrors the teacher's Tauri-managed state shape (a `Mutex<Option<Sender>>`
/// plus an `Arc<Mutex<Option<Snapshot>>>` shared with the loop thread) but
/// with the Tauri-specific plumbing stripped: nothing here depends on an
/// `AppHandle` or frontend event bus, so it works equally well driven by a
/// CLI, a test, or any other embedder.
pub struct AppState {
    /// `None` before `start` is called.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Updated by the game loop thread after each tick; read without
    /// blocking the simulation thread.
    pub latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    pub running: Mutex<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert!(state.command_tx.lock().unwrap().is_none());
        assert!(state.latest_snapshot.lock().unwrap().is_none());
        assert!(!*state.running.lock().unwrap());
    }
}

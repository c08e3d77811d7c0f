//! Driver-facing operations on a running (or not-yet-started) `AppState`.
//!
//! These were `#[tauri::command]` handlers invoked by a frontend via
//! `invoke()` in the source this crate was built from; here they're plain
//! functions any embedder — a CLI, an integration test, a future
//! network-facing front end — can call directly.

use rp_core::commands::Command;
use rp_core::state::GameStateSnapshot;
use rp_sim::engine::SimulationEngine;

use crate::game_loop::{self, AiRoster};
use crate::state::{AppState, GameLoopCommand};

/// Starts the simulation, spawning the game loop thread if not already
/// running.
pub fn start_simulation(state: &AppState, engine: SimulationEngine, ai: AiRoster) -> Result<(), String> {
    let mut running = state.running.lock().map_err(|e| e.to_string())?;
    if *running {
        return Err("simulation already running".into());
    }

    let tx = game_loop::spawn_game_loop(engine, ai, state.latest_snapshot.clone());

    let mut tx_lock = state.command_tx.lock().map_err(|e| e.to_string())?;
    *tx_lock = Some(tx);
    *running = true;
    Ok(())
}

/// Posts a command to the running simulation.
pub fn post_command(state: &AppState, command: Command) -> Result<(), String> {
    let tx_lock = state.command_tx.lock().map_err(|e| e.to_string())?;
    match tx_lock.as_ref() {
        Some(tx) => tx.send(GameLoopCommand::Post(command)).map_err(|e| format!("failed to post command: {e}")),
        None => Err("simulation not started".into()),
    }
}

/// Reads the most recently published snapshot, if any.
pub fn get_snapshot(state: &AppState) -> Result<Option<GameStateSnapshot>, String> {
    let lock = state.latest_snapshot.lock().map_err(|e| e.to_string())?;
    Ok(lock.clone())
}

/// Signals the game loop thread to stop after its current tick.
pub fn shutdown(state: &AppState) -> Result<(), String> {
    let mut tx_lock = state.command_tx.lock().map_err(|e| e.to_string())?;
    if let Some(tx) = tx_lock.take() {
        let _ = tx.send(GameLoopCommand::Shutdown);
    }
    *state.running.lock().map_err(|e| e.to_string())? = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::types::{Color, PlayerNo, WorldDims};
    use rp_sim::engine::SimConfig;
    use rp_sim::players::Player;
    use rp_sim::templates::TemplateLibrary;

    fn demo_engine() -> SimulationEngine {
        let config = SimConfig {
            seed: 7,
            world_dims: WorldDims::new(64.0, 64.0),
            simulation_k: 2,
            local_player_no: PlayerNo(1),
        };
        let mut engine = SimulationEngine::new(config, TemplateLibrary::new(), None);
        engine.set_players(vec![Player::local(PlayerNo(1), "host", Color::from_rgba(1, 2, 3, 255))]);
        engine
    }

    #[test]
    fn test_send_command_before_start_fails() {
        let state = AppState::new();
        let result = post_command(&state, Command::ConnectPlayer { player_no: PlayerNo(2) });
        assert!(result.is_err());
    }

    #[test]
    fn test_start_twice_fails() {
        let state = AppState::new();
        start_simulation(&state, demo_engine(), AiRoster::new()).unwrap();
        let result = start_simulation(&state, demo_engine(), AiRoster::new());
        assert!(result.is_err());
        shutdown(&state).unwrap();
    }

    #[test]
    fn test_shutdown_allows_restart() {
        let state = AppState::new();
        start_simulation(&state, demo_engine(), AiRoster::new()).unwrap();
        shutdown(&state).unwrap();
        assert!(start_simulation(&state, demo_engine(), AiRoster::new()).is_ok());
        shutdown(&state).unwrap();
    }
}

//! Game loop thread — runs the simulation engine at its fixed tick rate and
//! publishes a snapshot after every tick.
//!
//! The engine is created inside this thread because it owns `!Send` AI
//! script hosts (`rhai::Engine` isn't `Sync`); moving construction here
//! keeps everything that touches the engine or its scripts on one thread.
//! Commands arrive via an `mpsc` channel from whatever is driving the
//! simulation (a CLI harness, a test, a future network-facing front end).

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::warn;

use rp_ai::ScriptHost;
use rp_core::constants::TICK_RATE;
use rp_core::state::GameStateSnapshot;
use rp_core::types::PlayerNo;
use rp_sim::engine::SimulationEngine;

use crate::state::GameLoopCommand;

/// Nominal duration of one tick at the simulation's fixed rate.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// The set of AI players' script hosts, keyed by player number. Implements
/// the `ai_hook` signature `SimulationEngine::tick` expects by running each
/// host against the same tick's events and merging whatever orders come
/// back.
#[derive(Default)]
pub struct AiRoster(HashMap<PlayerNo, ScriptHost>);

impl AiRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player_no: PlayerNo, host: ScriptHost) {
        self.0.insert(player_no, host);
    }

    fn tick(
        &mut self,
        entities: &rp_sim::entity::EntityManager,
        events: &[rp_core::events::SimEvent],
        players: &[rp_sim::players::Player],
    ) -> Vec<rp_core::commands::Command> {
        let mut commands = Vec::new();
        for host in self.0.values_mut() {
            commands.extend(host.tick(entities, events, players));
        }
        commands
    }
}

/// Spawns the game loop in a new thread. Returns the command sender for the
/// driving side to use; `latest_snapshot` must be the same handle passed to
/// `AppState` so `commands::get_snapshot` can read it back.
pub fn spawn_game_loop(
    mut engine: SimulationEngine,
    mut ai: AiRoster,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
) -> mpsc::Sender<GameLoopCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    std::thread::Builder::new()
        .name("rp-sim-loop".into())
        .spawn(move || {
            engine.start();
            run_game_loop(&mut engine, &mut ai, cmd_rx, &latest_snapshot);
        })
        .expect("failed to spawn game loop thread");

    cmd_tx
}

/// The game loop. Runs until a `Shutdown` command or channel disconnect.
fn run_game_loop(
    engine: &mut SimulationEngine,
    ai: &mut AiRoster,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let mut next_tick_time = Instant::now();

    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Post(cmd)) => engine.post_command(cmd),
                Ok(GameLoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        let snapshot = engine.tick(|entities, events, players| ai.tick(entities, events, players));

        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        } else {
            warn!("latest snapshot mutex poisoned");
        }

        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind — reset rather than spiral trying to catch up.
            next_tick_time = now;
        }
    }
}

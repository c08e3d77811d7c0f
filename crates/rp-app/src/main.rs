//! Headless CLI harness: loads settings, builds a `SimulationEngine` with a
//! host-side transport and a scripted AI opponent, and runs it for a fixed
//! number of ticks, logging periodic snapshot summaries.
//!
//! There is no rendering or GUI layer in this scope. Real peer-to-peer play
//! and the rendezvous join handshake are exercised end-to-end by the
//! integration tests in `tests/`; this binary is a single-process demo of
//! the same wiring.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rp_ai::ScriptHost;
use rp_core::commands::Command;
use rp_core::config::{Cli, Settings};
use rp_core::types::{Color, PlayerNo, Vec3, WorldDims};
use rp_net::transport::InMemoryNetworkHandle;
use rp_sim::engine::{SimConfig, SimulationEngine};
use rp_sim::players::Player;
use rp_sim::templates::{ComponentParams, EntityTemplate, MoveableParams, PositionParams, TemplateLibrary};

use rp_app::commands as app_commands;
use rp_app::game_loop::AiRoster;
use rp_app::state::AppState;

/// A minimal script every demo AI opponent runs when no script file is
/// configured: it waits three seconds then sends its first unit toward the
/// middle of the map.
const DEFAULT_AI_SCRIPT: &str = r#"
    timer(3.0, || {
        let units = my_units();
        if units.len() > 0 {
            issue_order(units, "move", #{ x: 32.0, y: 0.0, z: 32.0 });
        }
    });
"#;

/// Number of ticks the demo harness runs before exiting.
const DEMO_TICK_COUNT: u32 = 150;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(
        Some(Path::new("/etc/ravaged-planets.conf")),
        dirs_home_config().as_deref(),
        &cli,
    )
    .context("loading settings")?;

    let _log = rp_core::logging::init(settings.debug_logfile.as_deref());
    info!(data_path = %settings.data_path.display(), "starting ravaged-planets headless harness");

    let templates = load_templates(&settings.data_path).unwrap_or_else(|e| {
        info!(error = %e, "no template directory found, using built-in demo templates");
        builtin_templates()
    });

    let state = AppState::new();
    let engine = build_engine(&settings, templates);
    let ai = build_ai_roster(&settings)?;

    app_commands::start_simulation(&state, engine, ai).map_err(anyhow::Error::msg)?;

    app_commands::post_command(
        &state,
        Command::CreateEntity {
            player_no: PlayerNo(1),
            new_id: rp_core::types::EntityId::new(PlayerNo(1), 0).expect("first entity id is always valid"),
            template_name: "scout".to_string(),
            initial_pos: Vec3::new(4.0, 0.0, 4.0),
            initial_goal: Vec3::ZERO,
        },
    )
    .map_err(anyhow::Error::msg)?;

    for tick in 0..DEMO_TICK_COUNT {
        std::thread::sleep(Duration::from_millis(
            1000 / rp_core::constants::TICK_RATE as u64,
        ));
        if tick % 25 == 0 {
            if let Ok(Some(snapshot)) = app_commands::get_snapshot(&state) {
                info!(
                    tick = snapshot.time.tick,
                    entities = snapshot.entities.len(),
                    alerts = snapshot.alerts.len(),
                    "tick summary"
                );
            }
        }
    }

    app_commands::shutdown(&state).map_err(anyhow::Error::msg)?;
    Ok(())
}

fn dirs_home_config() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| Path::new(&home).join(".ravaged-planets").join("config"))
}

fn load_templates(data_path: &Path) -> Result<TemplateLibrary> {
    let dir = data_path.join("templates");
    TemplateLibrary::load_dir(&dir).map_err(|e| anyhow::anyhow!("{e}"))
}

/// Templates used when no `<data-path>/templates` directory is configured,
/// so the harness always has something to run.
fn builtin_templates() -> TemplateLibrary {
    let mut lib = TemplateLibrary::new();
    lib.insert(
        "scout",
        EntityTemplate {
            components: ComponentParams {
                position: Some(PositionParams::default()),
                moveable: Some(MoveableParams { speed: Some(6.0), ..Default::default() }),
                ..Default::default()
            },
            attributes: Default::default(),
        },
    );
    lib
}

fn build_engine(settings: &Settings, templates: TemplateLibrary) -> SimulationEngine {
    let config = SimConfig {
        seed: 1,
        world_dims: WorldDims::new(64.0, 64.0),
        simulation_k: settings.simulation_k,
        local_player_no: PlayerNo(1),
    };

    let network = InMemoryNetworkHandle::new();
    let host_transport = network.new_transport();

    let mut engine =
        SimulationEngine::new(config, templates, None).with_transport(Box::new(host_transport));
    engine.set_players(vec![
        Player::local(PlayerNo(1), "host", Color::from_rgba(220, 40, 40, 255)),
        Player::ai(PlayerNo(2), "skirmish-ai", Color::from_rgba(40, 120, 220, 255)),
    ]);
    engine
}

fn build_ai_roster(settings: &Settings) -> Result<AiRoster> {
    let mut roster = AiRoster::new();
    let host = ScriptHost::new(DEFAULT_AI_SCRIPT, PlayerNo(2), settings.simulation_k as u64)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("compiling demo AI script")?;
    roster.insert(PlayerNo(2), host);
    Ok(roster)
}

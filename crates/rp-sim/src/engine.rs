//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the entity store, the spatial/pathing
//! infrastructure, and the lockstep command schedule, and produces
//! `GameStateSnapshot`s. Completely headless (no rendering dependency),
//! enabling deterministic testing.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use rp_core::commands::Command;
use rp_core::constants::DEFAULT_SIMULATION_K;
use rp_core::enums::GamePhase;
use rp_core::events::SimEvent;
use rp_core::state::GameStateSnapshot;
use rp_core::types::{PlayerNo, SimTime, WorldDims};
use rp_net::{Transport, TransportEvent};
use rp_net::transport::PeerId;
use rp_net::packet::Packet;
use rp_pathfinding::PathWorker;
use rp_world::{PatchManager, Terrain};

use crate::entity::EntityManager;
use crate::players::Player;
use crate::systems;
use crate::systems::pathing::PathResultSlot;
use crate::templates::{apply_create_entity, TemplateLibrary};

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub world_dims: WorldDims,
    /// Turn delay between a command being posted and it executing on every
    /// peer. Negotiated at join time; see `rp_core::config::Settings`.
    pub simulation_k: u32,
    pub local_player_no: PlayerNo,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_dims: WorldDims::new(256.0, 256.0),
            simulation_k: DEFAULT_SIMULATION_K,
            local_player_no: PlayerNo(1),
        }
    }
}

/// A handle that can post commands from any thread without touching the
/// engine itself — the simulation thread drains it once per tick.
#[derive(Clone)]
pub struct CommandPoster(Arc<Mutex<VecDeque<Command>>>);

impl CommandPoster {
    pub fn post(&self, command: Command) {
        self.0.lock().expect("post queue mutex poisoned").push_back(command);
    }
}

/// The simulation engine. Owns the entity store and all sim state.
pub struct SimulationEngine {
    entities: EntityManager,
    templates: TemplateLibrary,
    patches: PatchManager,
    terrain: Option<Terrain>,
    world_dims: WorldDims,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    simulation_k: u32,
    local_player_no: PlayerNo,
    players: Vec<Player>,
    transport: Option<Box<dyn Transport + Send>>,
    pathfinder: Option<PathWorker>,
    path_slots: HashMap<rp_core::types::EntityId, PathResultSlot>,
    /// Commands bound for a future turn, keyed by that turn's tick number.
    scheduled: BTreeMap<u64, Vec<Command>>,
    post_queue: Arc<Mutex<VecDeque<Command>>>,
    started: bool,
}

impl SimulationEngine {
    pub fn new(config: SimConfig, templates: TemplateLibrary, terrain: Option<Terrain>) -> Self {
        let patches = PatchManager::new(config.world_dims.width, config.world_dims.length);
        let pathfinder = terrain.as_ref().map(|t| PathWorker::spawn(t.collision.clone()));

        Self {
            entities: EntityManager::new(),
            templates,
            patches,
            terrain,
            world_dims: config.world_dims,
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            simulation_k: config.simulation_k,
            local_player_no: config.local_player_no,
            players: Vec::new(),
            transport: None,
            pathfinder,
            path_slots: HashMap::new(),
            scheduled: BTreeMap::new(),
            post_queue: Arc::new(Mutex::new(VecDeque::new())),
            started: false,
        }
    }

    pub fn with_transport(mut self, transport: Box<dyn Transport + Send>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn set_players(&mut self, players: Vec<Player>) {
        self.players = players;
    }

    /// A cloneable handle that posts commands from any thread. `cmd` executes
    /// on every peer at turn `current + simulation_k`.
    pub fn poster(&self) -> CommandPoster {
        CommandPoster(Arc::clone(&self.post_queue))
    }

    /// Posts a command directly; equivalent to `poster().post(cmd)` but
    /// convenient when already holding `&SimulationEngine`.
    pub fn post_command(&self, command: Command) {
        self.post_queue.lock().expect("post queue mutex poisoned").push_back(command);
    }

    pub fn start(&mut self) {
        self.phase = GamePhase::Active;
        self.started = true;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn local_player_no(&self) -> PlayerNo {
        self.local_player_no
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Advances the simulation by one tick and returns the resulting
    /// snapshot. `ai_hook` is run between command execution and the
    /// outbound flush, with read-only access to the tick's events and
    /// world state; whatever commands it returns are posted exactly like
    /// any other caller's. Pass a no-op closure when no AI players are in
    /// play.
    pub fn tick<F>(&mut self, mut ai_hook: F) -> GameStateSnapshot
    where
        F: FnMut(&EntityManager, &[SimEvent], &[Player]) -> Vec<Command>,
    {
        // 1. Pull inbound peer events.
        let mut events = self.pull_transport_events();

        if self.phase == GamePhase::Active {
            // 3. Execute all commands scheduled for the current turn. Sorted
            // by ascending player_no first: each peer accumulates this
            // turn's bucket out of its own post (inserted immediately) and
            // every other peer's batch (inserted whenever its packet
            // arrives), so the merge order is a function of network timing
            // unless it's normalized here — this sort is what makes every
            // peer execute the same turn in the same order.
            if let Some(mut commands) = self.scheduled.remove(&self.time.tick) {
                commands.sort_by_key(|c| c.player_no());
                for command in commands {
                    events.extend(self.execute_command(command));
                }
            }

            // 4. Per-player tick hook (AI script evaluation; network flush
            // and local input sampling happen via post_command from the
            // caller's own thread, outside this method).
            let ai_commands = ai_hook(&self.entities, &events, &self.players);
            for command in ai_commands {
                self.post_command(command);
            }

            // Run every system in ComponentKind order.
            events.extend(self.run_systems());

            self.time.advance();
        }

        // 5. Schedule this tick's posted commands for turn + K and transmit
        // them to every connected peer.
        self.flush_posted_commands();

        let alerts = alerts_from(&events, self.time.tick);
        systems::snapshot::build_snapshot(&self.entities, self.time, self.phase, &self.players, alerts)
    }

    fn pull_transport_events(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let Some(transport) = self.transport.as_mut() else { return events };
        for event in transport.update() {
            match event {
                TransportEvent::Connected(peer) => self.adopt_peer(peer),
                TransportEvent::Received(_peer, Packet::CommandBatch { turn, commands }) => {
                    self.scheduled.entry(turn.0).or_default().extend(commands);
                }
                TransportEvent::Received(_peer, _other) => {
                    // Join/lobby/chat packets are handled above this layer
                    // (rp_net::handshake, rp_session); the simulation only
                    // cares about command batches.
                }
                TransportEvent::Disconnected(peer) => {
                    info!(peer, "peer disconnected");
                    if let Some(player) = self.players.iter_mut().find(|p| p.peer == Some(peer)) {
                        player.connected = false;
                        events.push(SimEvent::PlayerDisconnected { player_no: player.player_no });
                    }
                }
            }
        }
        events
    }

    /// Step 2: adopt a newly connected peer before the game starts; reject
    /// (by disconnecting) any connection attempted after it has.
    fn adopt_peer(&mut self, peer: PeerId) {
        if self.phase != GamePhase::Lobby {
            warn!(peer, "rejecting post-game join attempt");
            if let Some(transport) = self.transport.as_mut() {
                transport.disconnect(peer);
            }
            return;
        }
        info!(peer, "peer connected, awaiting ConnectPlayer command");
    }

    fn execute_command(&mut self, command: Command) -> Vec<SimEvent> {
        match command {
            Command::CreateEntity { .. } => match apply_create_entity(&mut self.entities, &self.templates, &command) {
                Ok(()) => {
                    if let Command::CreateEntity { new_id, template_name, .. } = command {
                        vec![SimEvent::EntityCreated { id: new_id, template_name }]
                    } else {
                        unreachable!()
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to execute CreateEntity command");
                    Vec::new()
                }
            },
            Command::Order { target_entity_id, order, .. } => {
                if let Some(entity) = self.entities.get(target_entity_id) {
                    if let Ok(mut orderable) =
                        self.entities.world().get::<&mut rp_core::components::OrderableComponent>(entity)
                    {
                        orderable.queue.push_back(order);
                    }
                }
                Vec::new()
            }
            Command::ConnectPlayer { player_no } => {
                if self.phase != GamePhase::Lobby {
                    warn!(player_no = player_no.0, "ignoring ConnectPlayer after game start");
                    return Vec::new();
                }
                match self.players.iter_mut().find(|p| p.player_no == player_no) {
                    Some(player) => player.connected = true,
                    None => {
                        let color = crate::templates::default_color_for_player(player_no);
                        self.players.push(Player::remote(player_no, format!("Player {}", player_no.0), color, 0));
                    }
                }
                vec![SimEvent::PlayerJoined { player_no }]
            }
        }
    }

    fn run_systems(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();

        systems::position::run(&mut self.entities, &mut self.patches, self.terrain.as_ref(), self.world_dims);
        systems::moveable::run(&mut self.entities, self.world_dims, self.time.dt());

        if let Some(worker) = self.pathfinder.as_ref() {
            systems::pathing::run(&mut self.entities, worker, &mut self.path_slots);
        }

        events.extend(systems::orderable::run(&mut self.entities, &self.templates, self.world_dims));

        for completed in systems::builder::run(&mut self.entities) {
            if let Some(command) = systems::builder::completed_build_to_command(&mut self.entities, completed) {
                self.post_command(command);
            }
        }

        systems::weapon::run(&mut self.entities, &self.templates);

        let impacts = systems::projectile::run(&mut self.entities);
        for id in systems::projectile::resolve_impacts(&mut self.entities, impacts) {
            events.push(SimEvent::EntityDestroyed { id });
        }

        for id in systems::damageable::run(&mut self.entities, &self.templates) {
            events.push(SimEvent::EntityDestroyed { id });
        }

        systems::cleanup::run(&mut self.entities);

        events
    }

    fn flush_posted_commands(&mut self) {
        let posted: Vec<Command> = {
            let mut queue = self.post_queue.lock().expect("post queue mutex poisoned");
            queue.drain(..).collect()
        };
        if posted.is_empty() {
            return;
        }

        let target_turn = self.time.tick + self.simulation_k as u64;
        self.scheduled.entry(target_turn).or_default().extend(posted.iter().cloned());

        if let Some(transport) = self.transport.as_mut() {
            let packet = Packet::CommandBatch { turn: rp_core::types::TurnId(target_turn), commands: posted };
            let peers: Vec<PeerId> = self.players.iter().filter_map(|p| p.peer).collect();
            for peer in peers {
                if let Err(e) = transport.send(peer, &packet) {
                    warn!(error = %e, peer, "failed to send command batch");
                }
            }
        }
    }
}

/// Turns the tick's events into user-visible alerts. Only player
/// connectivity changes are surfaced this way — entity churn is too frequent
/// to be worth a harness-level notice.
fn alerts_from(events: &[SimEvent], tick: u64) -> Vec<rp_core::events::Alert> {
    use rp_core::enums::AlertLevel;
    use rp_core::events::Alert;

    events
        .iter()
        .filter_map(|event| match event {
            SimEvent::PlayerJoined { player_no } => Some(Alert {
                level: AlertLevel::Info,
                message: format!("player {} joined", player_no.0),
                tick,
            }),
            SimEvent::PlayerDisconnected { player_no } => Some(Alert {
                level: AlertLevel::Warning,
                message: format!("player {} disconnected", player_no.0),
                tick,
            }),
            _ => None,
        })
        .collect()
}

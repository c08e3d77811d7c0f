//! Script host: wraps a compiled `rhai` script and evaluates it against one
//! AI-controlled player's view of the simulation.
//!
//! The script is compiled and run once at construction, which is where it
//! installs its initial `timer`/`event` subscriptions; thereafter the host
//! only reacts to due timers and incoming `SimEvent`s, exactly like a
//! JavaScript script reacting to `setTimeout`/`addEventListener` rather than
//! polling every frame. `issue_order` is the only way a script can affect
//! the game — it posts a `Command::Order` through the same channel a human
//! player's `post_command` uses, so a scripted player is indistinguishable
//! from a human one as far as the simulation driver and the wire protocol
//! are concerned.

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rhai::{Array, Dynamic, Engine, FnPtr, Map, Scope, AST};
use tracing::warn;

use rp_core::commands::Command;
use rp_core::components::{OwnableComponent, PositionComponent};
use rp_core::constants::DT;
use rp_core::events::SimEvent;
use rp_core::orders::Order;
use rp_core::types::{EntityId, PlayerNo, Vec3};
use rp_sim::entity::{EntityManager, Template};
use rp_sim::players::Player;

use crate::error::{AiError, AiResult};

/// A unit visible to a script at the start of the tick it's evaluated in.
/// Rebuilt from the `EntityManager` before any callback runs, so a script
/// can't observe a half-updated world mid-tick.
struct UnitView {
    id: EntityId,
    owner: PlayerNo,
    template_name: String,
    pos: Vec3,
}

struct PendingTimer {
    fire_at_secs: f64,
    callback: FnPtr,
}

struct HostState {
    rng: ChaCha8Rng,
    sim_time_secs: f64,
    pending_commands: Vec<Command>,
    timers: Vec<PendingTimer>,
    event_subs: std::collections::HashMap<String, Vec<FnPtr>>,
    units: Vec<UnitView>,
    player_no: PlayerNo,
}

impl HostState {
    fn refresh_units(&mut self, entities: &EntityManager) {
        self.units.clear();
        let world = entities.world();
        for (id, entity) in entities.ids_in_order() {
            let Ok(ownable) = world.get::<&OwnableComponent>(entity) else { continue };
            let template_name =
                world.get::<&Template>(entity).map(|t| t.0.clone()).unwrap_or_else(|_| String::new());
            let pos = world.get::<&PositionComponent>(entity).map(|p| p.pos).unwrap_or(Vec3::ZERO);
            self.units.push(UnitView { id, owner: ownable.owner, template_name, pos });
        }
    }
}

/// Evaluates one AI player's script. Not `Send`/`Sync` (rhai's default
/// engine isn't either) — one `ScriptHost` per AI player, driven from the
/// thread that owns the `SimulationEngine`.
pub struct ScriptHost {
    engine: Engine,
    ast: AST,
    scope: Scope<'static>,
    state: Rc<RefCell<HostState>>,
}

impl ScriptHost {
    /// Compiles `script` and runs its top-level statements once. `seed`
    /// should be derived from the match's world seed plus the player's
    /// number, so every peer that happens to also evaluate this script
    /// (e.g. during a deterministic replay) gets the same RNG stream.
    pub fn new(script: &str, player_no: PlayerNo, seed: u64) -> AiResult<Self> {
        let state = Rc::new(RefCell::new(HostState {
            rng: ChaCha8Rng::seed_from_u64(seed),
            sim_time_secs: 0.0,
            pending_commands: Vec::new(),
            timers: Vec::new(),
            event_subs: std::collections::HashMap::new(),
            units: Vec::new(),
            player_no,
        }));

        let mut engine = Engine::new();
        register_api(&mut engine, &state);

        let ast = engine.compile(script).map_err(|e| AiError::Parse(e.to_string()))?;
        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| AiError::Script(e.to_string()))?;

        Ok(Self { engine, ast, scope, state })
    }

    /// Advances the script host by one simulation tick: refreshes what the
    /// script can see, fires any due timers, dispatches this tick's events
    /// to subscribers, and drains whatever orders those callbacks issued.
    pub fn tick(&mut self, entities: &EntityManager, events: &[SimEvent], _players: &[Player]) -> Vec<Command> {
        {
            let mut state = self.state.borrow_mut();
            state.sim_time_secs += DT;
            state.refresh_units(entities);
        }

        let due: Vec<FnPtr> = {
            let mut state = self.state.borrow_mut();
            let now = state.sim_time_secs;
            let (due, still_pending): (Vec<_>, Vec<_>) =
                state.timers.drain(..).partition(|t| t.fire_at_secs <= now);
            state.timers = still_pending;
            due.into_iter().map(|t| t.callback).collect()
        };
        for callback in due {
            self.invoke(&callback, ());
        }

        for event in events {
            let subscribers: Vec<FnPtr> =
                self.state.borrow().event_subs.get(event.name()).cloned().unwrap_or_default();
            if subscribers.is_empty() {
                continue;
            }
            let payload = event_payload(event);
            for callback in subscribers {
                self.invoke(&callback, (payload.clone(),));
            }
        }

        self.state.borrow_mut().pending_commands.drain(..).collect()
    }

    /// Calls a script callback, logging and discarding any error it raises.
    /// Per-callback isolation is the point: one buggy `event` handler must
    /// never take down the simulation.
    fn invoke(&self, callback: &FnPtr, args: impl rhai::FuncArgs) {
        if let Err(e) = callback.call::<()>(&self.engine, &self.ast, args) {
            warn!(error = %e, "AI script callback failed");
        }
    }
}

fn event_payload(event: &SimEvent) -> Dynamic {
    let mut map = Map::new();
    match event {
        SimEvent::EntityCreated { id, template_name } => {
            map.insert("entity".into(), Dynamic::from(id.0 as i64));
            map.insert("template".into(), template_name.clone().into());
        }
        SimEvent::EntityDestroyed { id } => {
            map.insert("entity".into(), Dynamic::from(id.0 as i64));
        }
        SimEvent::OrderCompleted { entity, order } => {
            map.insert("entity".into(), Dynamic::from(entity.0 as i64));
            map.insert("order".into(), order_kind_name(order).into());
        }
        SimEvent::PlayerJoined { player_no } => {
            map.insert("player".into(), Dynamic::from(player_no.0 as i64));
        }
        SimEvent::PlayerDisconnected { player_no } => {
            map.insert("player".into(), Dynamic::from(player_no.0 as i64));
        }
    }
    Dynamic::from(map)
}

fn order_kind_name(order: &Order) -> &'static str {
    match order {
        Order::Move { .. } => "move",
        Order::Attack { .. } => "attack",
        Order::Build { .. } => "build",
    }
}

fn parse_order(kind: &str, params: &Map) -> Result<Order, Box<rhai::EvalAltResult>> {
    match kind {
        "move" => {
            let x = map_float(params, "x")?;
            let y = map_float(params, "y").unwrap_or(0.0);
            let z = map_float(params, "z")?;
            Ok(Order::Move { goal: Vec3::new(x as f32, y as f32, z as f32) })
        }
        "attack" => {
            let raw = params
                .get("target")
                .and_then(|d| d.as_int().ok())
                .ok_or_else(|| format!("issue_order(\"attack\", ..): missing integer \"target\""))?;
            let target = entity_id_from_raw(raw)?;
            Ok(Order::Attack { target })
        }
        "build" => {
            let template = params
                .get("template")
                .and_then(|d| d.clone().into_string().ok())
                .ok_or_else(|| format!("issue_order(\"build\", ..): missing string \"template\""))?;
            Ok(Order::Build { template_name: template })
        }
        other => Err(format!("issue_order: unknown order kind \"{other}\"").into()),
    }
}

fn map_float(params: &Map, key: &str) -> Result<f64, Box<rhai::EvalAltResult>> {
    params
        .get(key)
        .and_then(|d| d.as_float().ok().or_else(|| d.as_int().ok().map(|i| i as f64)))
        .ok_or_else(|| format!("issue_order: missing numeric field \"{key}\"").into())
}

fn entity_id_from_raw(raw: i64) -> Result<EntityId, Box<rhai::EvalAltResult>> {
    if raw < 0 || raw > u32::MAX as i64 {
        return Err(format!("not a valid entity id: {raw}").into());
    }
    Ok(EntityId(raw as u32))
}

fn register_api(engine: &mut Engine, state: &Rc<RefCell<HostState>>) {
    {
        let state = state.clone();
        engine.register_fn("timer", move |seconds: f64, callback: FnPtr| {
            let mut state = state.borrow_mut();
            let fire_at_secs = state.sim_time_secs + seconds;
            state.timers.push(PendingTimer { fire_at_secs, callback });
        });
    }
    {
        let state = state.clone();
        engine.register_fn("event", move |name: &str, callback: FnPtr| {
            state.borrow_mut().event_subs.entry(name.to_string()).or_default().push(callback);
        });
    }
    {
        let state = state.clone();
        engine.register_fn(
            "issue_order",
            move |units: Array, kind: &str, params: Map| -> Result<(), Box<rhai::EvalAltResult>> {
                let order = parse_order(kind, &params)?;
                let mut state = state.borrow_mut();
                let player_no = state.player_no;
                for unit in units {
                    let raw = unit.as_int().map_err(|_| "issue_order: unit id must be an integer")?;
                    let target_entity_id = entity_id_from_raw(raw)?;
                    state.pending_commands.push(Command::Order { player_no, target_entity_id, order: order.clone() });
                }
                Ok(())
            },
        );
    }
    {
        let state = state.clone();
        engine.register_fn("sim_time", move || state.borrow().sim_time_secs);
    }
    {
        let state = state.clone();
        engine.register_fn("rand_float", move || state.borrow_mut().rng.gen::<f64>());
    }
    {
        let state = state.clone();
        engine.register_fn("rand_range", move |lo: f64, hi: f64| -> f64 {
            if hi <= lo {
                return lo;
            }
            state.borrow_mut().rng.gen_range(lo..hi)
        });
    }
    {
        let state = state.clone();
        engine.register_fn("my_units", move || -> Array {
            let state = state.borrow();
            state
                .units
                .iter()
                .filter(|u| u.owner == state.player_no)
                .map(|u| Dynamic::from(u.id.0 as i64))
                .collect()
        });
    }
    {
        let state = state.clone();
        engine.register_fn("unit_info", move |id: i64| -> Dynamic {
            let state = state.borrow();
            let Some(unit) = state.units.iter().find(|u| u.id.0 as i64 == id) else {
                return Dynamic::UNIT;
            };
            let mut map = Map::new();
            map.insert("x".into(), (unit.pos.x as f64).into());
            map.insert("y".into(), (unit.pos.y as f64).into());
            map.insert("z".into(), (unit.pos.z as f64).into());
            map.insert("owner".into(), Dynamic::from(unit.owner.0 as i64));
            map.insert("template".into(), unit.template_name.clone().into());
            Dynamic::from(map)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_sim::entity::EntityManager;

    fn no_events() -> Vec<SimEvent> {
        Vec::new()
    }

    #[test]
    fn a_compile_error_is_reported_without_panicking() {
        let result = ScriptHost::new("this is not valid rhai (((", PlayerNo(1), 1);
        assert!(matches!(result, Err(AiError::Parse(_))));
    }

    #[test]
    fn a_timer_fires_after_its_delay_and_issues_an_order() {
        let script = r#"
            timer(0.5, || {
                issue_order([100], "move", #{ x: 1.0, y: 0.0, z: 2.0 });
            });
        "#;
        let mut host = ScriptHost::new(script, PlayerNo(1), 7).unwrap();
        let entities = EntityManager::new();

        // DT is 0.2s; three ticks only cover 0.6s but the timer should not
        // fire before the fourth tick at the earliest.
        let mut orders = Vec::new();
        for _ in 0..3 {
            orders = host.tick(&entities, &no_events(), &[]);
            assert!(orders.is_empty(), "timer fired earlier than its delay");
        }
        for _ in 0..3 {
            orders = host.tick(&entities, &no_events(), &[]);
            if !orders.is_empty() {
                break;
            }
        }
        assert_eq!(orders.len(), 1);
        assert!(matches!(orders[0], Command::Order { order: Order::Move { .. }, .. }));
    }

    #[test]
    fn an_event_subscription_receives_the_matching_event_only() {
        let script = r#"
            event("entity_created", |_| {
                issue_order([200], "build", #{ template: "scout" });
            });
        "#;
        let mut host = ScriptHost::new(script, PlayerNo(2), 1).unwrap();
        let entities = EntityManager::new();

        let unrelated = vec![SimEvent::PlayerJoined { player_no: PlayerNo(3) }];
        let orders = host.tick(&entities, &unrelated, &[]);
        assert!(orders.is_empty(), "should not react to events it didn't subscribe to");

        let matching =
            vec![SimEvent::EntityCreated { id: EntityId::new(PlayerNo(1), 0).unwrap(), template_name: "tank".into() }];
        let orders = host.tick(&entities, &matching, &[]);
        assert_eq!(orders.len(), 1);
        assert!(matches!(orders[0], Command::Order { order: Order::Build { .. }, .. }));
    }

    #[test]
    fn a_runtime_exception_in_one_callback_does_not_stop_the_host() {
        let script = r#"
            event("player_joined", |_| {
                throw "deliberate failure";
            });
            timer(0.2, || {
                issue_order([1], "move", #{ x: 0.0, z: 0.0 });
            });
        "#;
        let mut host = ScriptHost::new(script, PlayerNo(1), 3).unwrap();
        let entities = EntityManager::new();

        let bad_event = vec![SimEvent::PlayerJoined { player_no: PlayerNo(1) }];
        let orders = host.tick(&entities, &bad_event, &[]);
        assert!(orders.is_empty(), "a throwing callback must not surface as a panic or a stray command");

        let mut orders = Vec::new();
        for _ in 0..3 {
            orders = host.tick(&entities, &no_events(), &[]);
            if !orders.is_empty() {
                break;
            }
        }
        assert_eq!(orders.len(), 1, "the timer set up before the throwing callback should still fire");
    }

    #[test]
    fn issue_order_rejects_an_unknown_order_kind() {
        let script = r#"
            timer(0.0, || {
                issue_order([1], "teleport", #{});
            });
        "#;
        let mut host = ScriptHost::new(script, PlayerNo(1), 1).unwrap();
        let entities = EntityManager::new();
        let orders = host.tick(&entities, &no_events(), &[]);
        assert!(orders.is_empty(), "an unknown order kind should be caught and logged, not posted");
    }
}

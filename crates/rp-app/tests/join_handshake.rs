//! Exercises the real join handshake (`rp_net::handshake::HostJoinState`
//! over an actual `JoinRequest`/`JoinResponse` packet round trip) ahead of a
//! two-peer lockstep game, and the late-join-rejection path once a game has
//! started. `rp-sim`'s own tests pre-populate both peers' player lists
//! directly and skip this layer; this is the one place the handshake that
//! precedes it is driven end to end.

use rp_core::commands::Command;
use rp_core::events::SimEvent;
use rp_core::orders::Order;
use rp_core::types::{Color, EntityId, PlayerNo, Vec3, WorldDims};
use rp_net::handshake::{HostJoinState, RendezvousVerifier, COLOR_PALETTE};
use rp_net::packet::Packet;
use rp_net::transport::{InMemoryNetworkHandle, Transport, TransportEvent};
use rp_sim::engine::{SimConfig, SimulationEngine};
use rp_sim::entity::EntityManager;
use rp_sim::players::Player;
use rp_sim::templates::{
    ComponentParams, EntityTemplate, MoveableParams, OrderableParams, OwnableParams, PositionParams, TemplateLibrary,
};

struct StubVerifier;
impl RendezvousVerifier for StubVerifier {
    fn confirm_user(&self, user_id: u64) -> rp_net::NetResult<String> {
        Ok(format!("user-{user_id}"))
    }
}

fn no_ai(_: &EntityManager, _: &[SimEvent], _: &[Player]) -> Vec<Command> {
    Vec::new()
}

fn demo_color(n: u8) -> Color {
    Color::from_rgba(n.wrapping_mul(40), n.wrapping_mul(60), n.wrapping_mul(80), 255)
}

fn scout_templates() -> TemplateLibrary {
    let mut lib = TemplateLibrary::new();
    lib.insert(
        "scout",
        EntityTemplate {
            components: ComponentParams {
                position: Some(PositionParams::default()),
                ownable: Some(OwnableParams::default()),
                moveable: Some(MoveableParams { speed: Some(5.0), ..Default::default() }),
                orderable: Some(OrderableParams::default()),
                ..Default::default()
            },
            attributes: Default::default(),
        },
    );
    lib
}

#[test]
fn a_joiner_confirmed_through_rendezvous_converges_with_the_host() {
    let network = InMemoryNetworkHandle::new();
    let mut host_transport = network.new_transport();
    let mut joiner_transport = network.new_transport();
    let host_id = host_transport.id();
    let joiner_id = joiner_transport.id();

    joiner_transport.connect(&host_id.to_string()).unwrap();
    let host_events = host_transport.update();
    assert!(host_events.iter().any(|e| matches!(e, TransportEvent::Connected(p) if *p == joiner_id)));

    joiner_transport.send(host_id, &Packet::JoinRequest { user_id: 500, color: COLOR_PALETTE[1] }).unwrap();
    let host_events = host_transport.update();
    let request = host_events
        .into_iter()
        .find_map(|e| match e {
            TransportEvent::Received(_, packet @ Packet::JoinRequest { .. }) => Some(packet),
            _ => None,
        })
        .expect("host should have received the join request");

    let mut join_state = HostJoinState::new("island2".to_string(), 2);
    let response = join_state.accept(&StubVerifier, joiner_id, &request).unwrap();
    let (joiner_no, simulation_k) = match &response {
        Packet::JoinResponse { player_no, simulation_k, other_user_ids, .. } => {
            assert!(other_user_ids.is_empty(), "this joiner is the first peer");
            (*player_no, *simulation_k)
        }
        _ => panic!("HostJoinState::accept must reply with a JoinResponse"),
    };
    host_transport.send(joiner_id, &response).unwrap();

    let joiner_events = joiner_transport.update();
    assert!(joiner_events.iter().any(|e| matches!(e, TransportEvent::Received(_, Packet::JoinResponse { .. }))));

    let host_player_no = PlayerNo(1);
    let joiner_color = demo_color(joiner_no.0);

    let host_config = SimConfig {
        seed: 11,
        world_dims: WorldDims::new(100.0, 100.0),
        simulation_k,
        local_player_no: host_player_no,
    };
    let mut host =
        SimulationEngine::new(host_config, scout_templates(), None).with_transport(Box::new(host_transport));
    host.set_players(vec![
        Player::local(host_player_no, "host", demo_color(host_player_no.0)),
        Player::remote(joiner_no, "joiner", joiner_color, joiner_id),
    ]);
    host.start();

    let joiner_config = SimConfig {
        seed: 11,
        world_dims: WorldDims::new(100.0, 100.0),
        simulation_k,
        local_player_no: joiner_no,
    };
    let mut joiner =
        SimulationEngine::new(joiner_config, scout_templates(), None).with_transport(Box::new(joiner_transport));
    joiner.set_players(vec![
        Player::remote(host_player_no, "host", demo_color(host_player_no.0), host_id),
        Player::local(joiner_no, "joiner", joiner_color),
    ]);
    joiner.start();

    let scout_id = EntityId::new(host_player_no, 0).unwrap();
    host.post_command(Command::CreateEntity {
        player_no: host_player_no,
        new_id: scout_id,
        template_name: "scout".to_string(),
        initial_pos: Vec3::ZERO,
        initial_goal: Vec3::ZERO,
    });
    host.post_command(Command::Order {
        player_no: host_player_no,
        target_entity_id: scout_id,
        order: Order::Move { goal: Vec3::new(20.0, 0.0, 0.0) },
    });

    let mut host_snapshot = None;
    let mut joiner_snapshot = None;
    for _ in 0..60 {
        host_snapshot = Some(host.tick(no_ai));
        joiner_snapshot = Some(joiner.tick(no_ai));
    }

    let host_snapshot = host_snapshot.unwrap();
    let joiner_snapshot = joiner_snapshot.unwrap();
    assert_eq!(host_snapshot.entities, joiner_snapshot.entities, "both peers must agree on world state");

    let scout = host_snapshot.entities.iter().find(|e| e.id == scout_id).unwrap();
    let distance = scout.pos.sub(&Vec3::new(20.0, 0.0, 0.0)).length();
    assert!(distance < 0.5, "scout should have arrived near its goal, got {:?}", scout.pos);
}

#[test]
fn a_join_request_after_start_game_is_rejected() {
    let network = InMemoryNetworkHandle::new();
    let host_transport = network.new_transport();
    let host_id = host_transport.id();

    let config = SimConfig {
        seed: 3,
        world_dims: WorldDims::new(64.0, 64.0),
        simulation_k: 2,
        local_player_no: PlayerNo(1),
    };
    let mut host =
        SimulationEngine::new(config, TemplateLibrary::new(), None).with_transport(Box::new(host_transport));
    host.set_players(vec![Player::local(PlayerNo(1), "host", demo_color(1))]);
    host.start();

    let mut late_joiner = network.new_transport();
    let late_joiner_id = late_joiner.id();
    late_joiner.connect(&host_id.to_string()).unwrap();

    // The engine observes the Connected event on its next tick and, because
    // the game is already Active rather than Lobby, disconnects the peer
    // immediately instead of waiting for a JoinRequest.
    host.tick(no_ai);

    // `disconnect` tears down the rejected peer's own inbox, so anything
    // addressed to it — from any sender sharing this network — now fails,
    // which is the observable effect of the host having closed the
    // connection.
    let mut probe = network.new_transport();
    let result = probe.send(late_joiner_id, &Packet::Chat { player_no: PlayerNo(1), message: "hi".to_string() });
    assert!(result.is_err(), "a rejected peer's inbox should have been torn down on the host side");
}

//! The join handshake: a joiner connects to the host, the host confirms the
//! joiner's identity through the rendezvous service, assigns a player
//! number and color, and replies with everyone else already in the game.

use std::collections::HashMap;

use rp_core::types::{Color, PlayerNo};
use tracing::info;

use crate::error::{NetError, NetResult};
use crate::packet::Packet;
use crate::transport::PeerId;

/// The fixed palette the host assigns from when a joiner's requested color
/// is already taken.
pub const COLOR_PALETTE: [Color; 8] = [
    Color(0xFF0000FF),
    Color(0xFF00FF00),
    Color(0xFFFF0000),
    Color(0xFF00FFFF),
    Color(0xFFFF00FF),
    Color(0xFFFFFF00),
    Color(0xFF8000FF),
    Color(0xFFFF8000),
];

/// Confirms that a rendezvous-issued `user_id` maps to a real account and
/// returns its display name. Implemented by `rp_session` against the real
/// rendezvous service; tests use a stub.
pub trait RendezvousVerifier {
    fn confirm_user(&self, user_id: u64) -> NetResult<String>;
}

struct JoinedPeer {
    peer: PeerId,
    user_id: u64,
    player_no: PlayerNo,
    color: Color,
}

/// Tracks the game's accepted peers and assigns player numbers / colors as
/// new joiners are confirmed. Lives on the host.
pub struct HostJoinState {
    map_name: String,
    simulation_k: u32,
    peers: Vec<JoinedPeer>,
    next_player_no: u8,
}

impl HostJoinState {
    pub fn new(map_name: String, simulation_k: u32) -> Self {
        Self { map_name, simulation_k, peers: Vec::new(), next_player_no: 1 }
    }

    fn color_taken(&self, color: Color) -> bool {
        self.peers.iter().any(|p| p.color == color)
    }

    fn assign_color(&self, requested: Color) -> Color {
        if !self.color_taken(requested) {
            return requested;
        }
        COLOR_PALETTE
            .into_iter()
            .find(|&c| !self.color_taken(c))
            .unwrap_or(requested)
    }

    /// Processes an incoming `JoinRequest`, returning the `JoinResponse` to
    /// send back to `peer`.
    pub fn accept(
        &mut self,
        verifier: &dyn RendezvousVerifier,
        peer: PeerId,
        request: &Packet,
    ) -> NetResult<Packet> {
        let Packet::JoinRequest { user_id, color } = request else {
            return Err(NetError::PeerNotConnected(peer));
        };

        let display_name = verifier.confirm_user(*user_id)?;
        let assigned_color = self.assign_color(*color);
        let player_no = PlayerNo(self.next_player_no);
        self.next_player_no += 1;

        let other_user_ids: Vec<u64> = self.peers.iter().map(|p| p.user_id).collect();

        info!(user_id = *user_id, %display_name, player_no = player_no.0, "peer joined");

        self.peers.push(JoinedPeer { peer, user_id: *user_id, player_no, color: assigned_color });

        Ok(Packet::JoinResponse {
            map_name: self.map_name.clone(),
            player_no,
            simulation_k: self.simulation_k,
            other_user_ids,
        })
    }

    pub fn peer_player_no(&self, peer: PeerId) -> Option<PlayerNo> {
        self.peers.iter().find(|p| p.peer == peer).map(|p| p.player_no)
    }

    pub fn user_ids(&self) -> HashMap<PeerId, u64> {
        self.peers.iter().map(|p| (p.peer, p.user_id)).collect()
    }
}

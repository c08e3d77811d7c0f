//! Player bookkeeping: who's in the game, how their commands are produced,
//! and their network/connection state.

use rp_core::enums::PlayerKind;
use rp_core::types::{Color, PlayerNo};
use rp_net::PeerId;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub player_no: PlayerNo,
    pub display_name: String,
    pub color: Color,
    pub kind: PlayerKind,
    pub ready_to_start: bool,
    pub connected: bool,
    /// Set for `Remote` players once their transport connection is
    /// established; `None` for `Local`/`Ai` players.
    pub peer: Option<PeerId>,
}

impl Player {
    pub fn local(player_no: PlayerNo, display_name: impl Into<String>, color: Color) -> Self {
        Self {
            player_no,
            display_name: display_name.into(),
            color,
            kind: PlayerKind::Local,
            ready_to_start: false,
            connected: true,
            peer: None,
        }
    }

    pub fn remote(player_no: PlayerNo, display_name: impl Into<String>, color: Color, peer: PeerId) -> Self {
        Self {
            player_no,
            display_name: display_name.into(),
            color,
            kind: PlayerKind::Remote,
            ready_to_start: false,
            connected: true,
            peer: Some(peer),
        }
    }

    pub fn ai(player_no: PlayerNo, display_name: impl Into<String>, color: Color) -> Self {
        Self {
            player_no,
            display_name: display_name.into(),
            color,
            kind: PlayerKind::Ai,
            ready_to_start: true,
            connected: true,
            peer: None,
        }
    }
}

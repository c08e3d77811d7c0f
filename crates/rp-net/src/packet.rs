//! Wire packets exchanged between peers, keyed by a `u16` identifier prefix.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rp_core::commands::Command;
use rp_core::constants::DEFAULT_SIMULATION_K;
use rp_core::types::{Color, PlayerNo, TurnId};

use crate::codec::{
    read_color, read_command, read_player_no, read_string, read_turn_id, write_color, write_command,
    write_player_no, write_string, write_turn_id,
};
use crate::error::{NetError, NetResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Incoming join: carries the joiner's rendezvous user id and preferred color.
    JoinRequest { user_id: u64, color: Color },
    /// Reply: map name, this peer's assigned player number, the lockstep
    /// schedule delay, and the user ids of every other peer already in the game.
    JoinResponse { map_name: String, player_no: PlayerNo, simulation_k: u32, other_user_ids: Vec<u64> },
    /// A UTF-8 chat line.
    Chat { player_no: PlayerNo, message: String },
    /// The sender has loaded the map and is ready to begin.
    StartGame { player_no: PlayerNo },
    /// Simulation commands bound for a single turn.
    CommandBatch { turn: TurnId, commands: Vec<Command> },
}

impl Packet {
    pub fn id(&self) -> u16 {
        match self {
            Packet::JoinRequest { .. } => 1,
            Packet::JoinResponse { .. } => 2,
            Packet::Chat { .. } => 3,
            Packet::StartGame { .. } => 4,
            Packet::CommandBatch { .. } => 5,
        }
    }

    /// Whether this packet must be delivered reliably and in order. Every
    /// packet kind in this protocol is reliable; kept as a method so a
    /// future unreliable packet kind (e.g. voice/position hints) has a
    /// single place to change.
    pub fn reliable(&self) -> bool {
        true
    }
}

pub fn encode(packet: &Packet) -> NetResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_u16::<LittleEndian>(packet.id())?;
    match packet {
        Packet::JoinRequest { user_id, color } => {
            buf.write_u64::<LittleEndian>(*user_id)?;
            write_color(&mut buf, *color)?;
        }
        Packet::JoinResponse { map_name, player_no, simulation_k, other_user_ids } => {
            write_string(&mut buf, map_name)?;
            write_player_no(&mut buf, *player_no)?;
            buf.write_u32::<LittleEndian>(*simulation_k)?;
            buf.write_u16::<LittleEndian>(other_user_ids.len() as u16)?;
            for id in other_user_ids {
                buf.write_u64::<LittleEndian>(*id)?;
            }
        }
        Packet::Chat { player_no, message } => {
            write_player_no(&mut buf, *player_no)?;
            write_string(&mut buf, message)?;
        }
        Packet::StartGame { player_no } => {
            write_player_no(&mut buf, *player_no)?;
        }
        Packet::CommandBatch { turn, commands } => {
            write_turn_id(&mut buf, *turn)?;
            buf.write_u16::<LittleEndian>(commands.len() as u16)?;
            for command in commands {
                write_command(&mut buf, command)?;
            }
        }
    }
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> NetResult<Packet> {
    let mut r = bytes;
    let id = r.read_u16::<LittleEndian>()?;
    Ok(match id {
        1 => Packet::JoinRequest {
            user_id: r.read_u64::<LittleEndian>()?,
            color: read_color(&mut r)?,
        },
        2 => {
            let map_name = read_string(&mut r)?;
            let player_no = read_player_no(&mut r)?;
            let simulation_k = r.read_u32::<LittleEndian>()?;
            let count = r.read_u16::<LittleEndian>()? as usize;
            let mut other_user_ids = Vec::with_capacity(count);
            for _ in 0..count {
                other_user_ids.push(r.read_u64::<LittleEndian>()?);
            }
            Packet::JoinResponse { map_name, player_no, simulation_k, other_user_ids }
        }
        3 => Packet::Chat { player_no: read_player_no(&mut r)?, message: read_string(&mut r)? },
        4 => Packet::StartGame { player_no: read_player_no(&mut r)? },
        5 => {
            let turn = read_turn_id(&mut r)?;
            let count = r.read_u16::<LittleEndian>()? as usize;
            let mut commands = Vec::with_capacity(count);
            for _ in 0..count {
                commands.push(read_command(&mut r)?);
            }
            Packet::CommandBatch { turn, commands }
        }
        other => return Err(NetError::UnknownPacket(other)),
    })
}

impl Packet {
    pub fn join_response_with_default_k(map_name: String, player_no: PlayerNo, other_user_ids: Vec<u64>) -> Packet {
        Packet::JoinResponse { map_name, player_no, simulation_k: DEFAULT_SIMULATION_K, other_user_ids }
    }
}

/// Frames a packet for a stream transport: a `u32` length prefix followed by
/// the packet bytes.
pub fn write_framed<W: Write>(mut w: W, packet: &Packet) -> NetResult<()> {
    let bytes = encode(packet)?;
    w.write_u32::<LittleEndian>(bytes.len() as u32)?;
    w.write_all(&bytes)?;
    Ok(())
}

pub fn read_framed<R: Read>(mut r: R) -> NetResult<Packet> {
    let len = r.read_u32::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    decode(&buf)
}

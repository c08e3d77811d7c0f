//! Fixed little-endian wire encoding (see the peer networking design notes).
//!
//! Primitive widths: i32/u32/f32 = 4 bytes, i16/u16 = 2, i64/u64 = 8, u8 = 1.
//! `Vec3` is three f32s. `Color` is a u32. Strings are a u16 length prefix
//! followed by UTF-8 bytes. Command and order bodies serialize field-by-field
//! in declaration order.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rp_core::commands::Command;
use rp_core::orders::Order;
use rp_core::types::{Color, EntityId, PlayerNo, TurnId, Vec3};

use crate::error::{NetError, NetResult};

pub const MAX_STRING_LEN: usize = u16::MAX as usize;

pub fn write_string<W: Write>(mut w: W, s: &str) -> NetResult<()> {
    let bytes = s.as_bytes();
    if bytes.len() > MAX_STRING_LEN {
        return Err(NetError::StringTooLong);
    }
    w.write_u16::<LittleEndian>(bytes.len() as u16)?;
    w.write_all(bytes)?;
    Ok(())
}

pub fn read_string<R: Read>(mut r: R) -> NetResult<String> {
    let len = r.read_u16::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| NetError::InvalidUtf8)
}

pub fn write_vec3<W: Write>(mut w: W, v: Vec3) -> io::Result<()> {
    w.write_f32::<LittleEndian>(v.x)?;
    w.write_f32::<LittleEndian>(v.y)?;
    w.write_f32::<LittleEndian>(v.z)
}

pub fn read_vec3<R: Read>(mut r: R) -> io::Result<Vec3> {
    let x = r.read_f32::<LittleEndian>()?;
    let y = r.read_f32::<LittleEndian>()?;
    let z = r.read_f32::<LittleEndian>()?;
    Ok(Vec3::new(x, y, z))
}

pub fn write_color<W: Write>(mut w: W, c: Color) -> io::Result<()> {
    w.write_u32::<LittleEndian>(c.0)
}

pub fn read_color<R: Read>(mut r: R) -> io::Result<Color> {
    Ok(Color(r.read_u32::<LittleEndian>()?))
}

pub fn write_entity_id<W: Write>(mut w: W, id: EntityId) -> io::Result<()> {
    w.write_u32::<LittleEndian>(id.0)
}

pub fn read_entity_id<R: Read>(mut r: R) -> io::Result<EntityId> {
    Ok(EntityId(r.read_u32::<LittleEndian>()?))
}

pub fn write_player_no<W: Write>(mut w: W, p: PlayerNo) -> io::Result<()> {
    w.write_u8(p.0)
}

pub fn read_player_no<R: Read>(mut r: R) -> io::Result<PlayerNo> {
    Ok(PlayerNo(r.read_u8()?))
}

pub fn write_turn_id<W: Write>(mut w: W, t: TurnId) -> io::Result<()> {
    w.write_u64::<LittleEndian>(t.0)
}

pub fn read_turn_id<R: Read>(mut r: R) -> io::Result<TurnId> {
    Ok(TurnId(r.read_u64::<LittleEndian>()?))
}

pub fn write_order<W: Write>(mut w: W, order: &Order) -> NetResult<()> {
    w.write_u8(order.wire_id())?;
    match order {
        Order::Move { goal } => write_vec3(&mut w, *goal)?,
        Order::Attack { target } => write_entity_id(&mut w, *target)?,
        Order::Build { template_name } => write_string(&mut w, template_name)?,
    }
    Ok(())
}

pub fn read_order<R: Read>(mut r: R) -> NetResult<Order> {
    let kind = r.read_u8()?;
    Ok(match kind {
        1 => Order::Move { goal: read_vec3(&mut r)? },
        2 => Order::Attack { target: read_entity_id(&mut r)? },
        3 => Order::Build { template_name: read_string(&mut r)? },
        other => return Err(NetError::UnknownOrderKind(other)),
    })
}

pub fn write_command<W: Write>(mut w: W, command: &Command) -> NetResult<()> {
    w.write_u8(command.wire_id())?;
    match command {
        Command::CreateEntity { player_no, new_id, template_name, initial_pos, initial_goal } => {
            write_player_no(&mut w, *player_no)?;
            write_entity_id(&mut w, *new_id)?;
            write_string(&mut w, template_name)?;
            write_vec3(&mut w, *initial_pos)?;
            write_vec3(&mut w, *initial_goal)?;
        }
        Command::Order { player_no, target_entity_id, order } => {
            write_player_no(&mut w, *player_no)?;
            write_entity_id(&mut w, *target_entity_id)?;
            write_order(&mut w, order)?;
        }
        Command::ConnectPlayer { player_no } => {
            write_player_no(&mut w, *player_no)?;
        }
    }
    Ok(())
}

pub fn read_command<R: Read>(mut r: R) -> NetResult<Command> {
    let kind = r.read_u8()?;
    Ok(match kind {
        1 => Command::CreateEntity {
            player_no: read_player_no(&mut r)?,
            new_id: read_entity_id(&mut r)?,
            template_name: read_string(&mut r)?,
            initial_pos: read_vec3(&mut r)?,
            initial_goal: read_vec3(&mut r)?,
        },
        2 => Command::Order {
            player_no: read_player_no(&mut r)?,
            target_entity_id: read_entity_id(&mut r)?,
            order: read_order(&mut r)?,
        },
        3 => Command::ConnectPlayer { player_no: read_player_no(&mut r)? },
        other => return Err(NetError::UnknownCommandKind(other)),
    })
}

//! Binary I/O for the `heightfield` and `collision_data` map files.
//!
//! Layout (fixed little-endian, following the fixed-width wire convention
//! used everywhere else in this workspace):
//!   heightfield:     i32 version=1, i32 width, i32 length, width*length f32 heights (row-major, z then x)
//!   collision_data:  i32 version=1, i32 width, i32 length, width*length u8 (0=blocked, 1=passable)

use std::io::{self, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::collision::CollisionBitmap;
use crate::error::{WorldError, WorldResult};
use crate::terrain::Terrain;

const FORMAT_VERSION: i32 = 1;

pub fn write_heightfield<W: Write>(mut w: W, width: u32, length: u32, heights: &[f32]) -> io::Result<()> {
    w.write_i32::<LittleEndian>(FORMAT_VERSION)?;
    w.write_i32::<LittleEndian>(width as i32)?;
    w.write_i32::<LittleEndian>(length as i32)?;
    for &h in heights {
        w.write_f32::<LittleEndian>(h)?;
    }
    Ok(())
}

pub fn read_heightfield<R: Read>(mut r: R) -> WorldResult<(u32, u32, Vec<f32>)> {
    let version = r.read_i32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(WorldError::Parse(format!("unsupported heightfield version {version}")));
    }
    let width = r.read_i32::<LittleEndian>()? as u32;
    let length = r.read_i32::<LittleEndian>()? as u32;
    let mut heights = Vec::with_capacity((width * length) as usize);
    for _ in 0..(width * length) {
        heights.push(r.read_f32::<LittleEndian>()?);
    }
    Ok((width, length, heights))
}

pub fn write_collision_data<W: Write>(mut w: W, bitmap: &CollisionBitmap) -> io::Result<()> {
    w.write_i32::<LittleEndian>(FORMAT_VERSION)?;
    w.write_i32::<LittleEndian>(bitmap.width as i32)?;
    w.write_i32::<LittleEndian>(bitmap.length as i32)?;
    for &passable in bitmap.as_bits() {
        w.write_u8(if passable { 1 } else { 0 })?;
    }
    Ok(())
}

pub fn read_collision_data<R: Read>(mut r: R) -> WorldResult<CollisionBitmap> {
    let version = r.read_i32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(WorldError::Parse(format!("unsupported collision_data version {version}")));
    }
    let width = r.read_i32::<LittleEndian>()? as u32;
    let length = r.read_i32::<LittleEndian>()? as u32;
    let mut bits = Vec::with_capacity((width * length) as usize);
    for _ in 0..(width * length) {
        bits.push(r.read_u8()? != 0);
    }
    Ok(CollisionBitmap::new(width, length, bits))
}

/// Loads `heightfield` from a map directory, deriving `Terrain` (and thus
/// its own collision bitmap from terrain normals — `collision_data`, if
/// present, is kept separately rather than overriding it, since authored
/// collision data may encode obstacles the heightmap alone cannot express).
pub fn load_terrain(map_dir: &Path) -> WorldResult<Terrain> {
    let path = map_dir.join("heightfield");
    let file = std::fs::File::open(&path)?;
    let (width, length, heights) = read_heightfield(file)?;
    Terrain::new(width, length, heights)
}

pub fn save_terrain(map_dir: &Path, terrain: &Terrain) -> WorldResult<()> {
    std::fs::create_dir_all(map_dir)?;
    let file = std::fs::File::create(map_dir.join("heightfield"))?;
    write_heightfield(file, terrain.width, terrain.length, &terrain.heights)?;
    let file = std::fs::File::create(map_dir.join("collision_data"))?;
    write_collision_data(file, &terrain.collision)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heightfield_roundtrip() {
        let heights: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let mut buf = Vec::new();
        write_heightfield(&mut buf, 4, 4, &heights).unwrap();
        let (w, l, back) = read_heightfield(&buf[..]).unwrap();
        assert_eq!(w, 4);
        assert_eq!(l, 4);
        assert_eq!(back, heights);
    }

    #[test]
    fn test_collision_data_roundtrip() {
        let bitmap = CollisionBitmap::new(2, 2, vec![true, false, false, true]);
        let mut buf = Vec::new();
        write_collision_data(&mut buf, &bitmap).unwrap();
        let back = read_collision_data(&buf[..]).unwrap();
        assert_eq!(back, bitmap);
    }

    #[test]
    fn test_read_heightfield_rejects_bad_version() {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(99).unwrap();
        buf.write_i32::<LittleEndian>(1).unwrap();
        buf.write_i32::<LittleEndian>(1).unwrap();
        buf.write_f32::<LittleEndian>(0.0).unwrap();
        assert!(read_heightfield(&buf[..]).is_err());
    }
}

//! The toroidal terrain grid: heights, normals, and the collision bitmap
//! that both the Position component's terrain-snap and the pathfinder
//! consume.

use rp_core::types::{Vec3, WorldDims};

use crate::collision::CollisionBitmap;
use crate::error::{WorldError, WorldResult};

/// A loaded terrain heightmap. `width`/`length` are vertex counts (the world
/// wraps at the edges, so vertex `width-1` is adjacent to vertex `0`).
#[derive(Debug, Clone)]
pub struct Terrain {
    pub width: u32,
    pub length: u32,
    /// Heights in meters, row-major (z, then x).
    pub heights: Vec<f32>,
    pub collision: CollisionBitmap,
}

impl Terrain {
    pub fn new(width: u32, length: u32, heights: Vec<f32>) -> WorldResult<Self> {
        if heights.len() != (width * length) as usize {
            return Err(WorldError::Invariant(format!(
                "expected {} heights, got {}",
                width * length,
                heights.len()
            )));
        }
        let normals_y = compute_normals_y(width, length, &heights);
        let collision = CollisionBitmap::from_normals(width, length, &normals_y);
        Ok(Self {
            width,
            length,
            heights,
            collision,
        })
    }

    pub fn dims(&self) -> WorldDims {
        WorldDims::new(self.width as f32, self.length as f32)
    }

    fn raw_height(&self, x: i64, z: i64) -> f32 {
        let wx = x.rem_euclid(self.width as i64) as usize;
        let wz = z.rem_euclid(self.length as i64) as usize;
        self.heights[wz * self.width as usize + wx]
    }

    /// Bilinearly interpolated height at a fractional, toroidally wrapped
    /// (x, z).
    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        let (x, z) = self.dims().wrap(x, z);
        let x0 = x.floor() as i64;
        let z0 = z.floor() as i64;
        let fx = x - x0 as f32;
        let fz = z - z0 as f32;

        let h00 = self.raw_height(x0, z0);
        let h10 = self.raw_height(x0 + 1, z0);
        let h01 = self.raw_height(x0, z0 + 1);
        let h11 = self.raw_height(x0 + 1, z0 + 1);

        let top = h00 * (1.0 - fx) + h10 * fx;
        let bottom = h01 * (1.0 - fx) + h11 * fx;
        top * (1.0 - fz) + bottom * fz
    }

    /// Surface normal at (x, z), sampled the same way the source does:
    /// three points (forward, left, right of an arbitrary basis) projected
    /// onto the terrain, then the cross product of the two edges.
    pub fn get_normal(&self, x: f32, z: f32) -> Vec3 {
        let h_c = self.get_height(x, z);
        let h_px = self.get_height(x + 1.0, z);
        let h_pz = self.get_height(x, z + 1.0);
        let v1 = Vec3::new(0.0, h_c, 0.0);
        let v2 = Vec3::new(1.0, h_px, 0.0);
        let v3 = Vec3::new(0.0, h_pz, 1.0);
        v2.sub(&v1).cross(&v3.sub(&v1)).normalized()
    }
}

fn compute_normals_y(width: u32, length: u32, heights: &[f32]) -> Vec<f32> {
    let at = |x: i64, z: i64| -> f32 {
        let wx = x.rem_euclid(width as i64) as usize;
        let wz = z.rem_euclid(length as i64) as usize;
        heights[wz * width as usize + wx]
    };
    let mut out = Vec::with_capacity((width * length) as usize);
    for z in 0..length as i64 {
        for x in 0..width as i64 {
            let v1 = Vec3::new(x as f32, at(x, z), z as f32);
            let v2 = Vec3::new(x as f32 + 1.0, at(x + 1, z), z as f32);
            let v3 = Vec3::new(x as f32, at(x, z + 1), z as f32 + 1.0);
            let normal = v2.sub(&v1).cross(&v3.sub(&v1)).normalized();
            out.push(normal.y);
        }
    }
    out
}

//! Collision bitmap: one bit per terrain vertex, derived from the terrain's
//! normals. A vertex is passable when the dot product of its normal with
//! the world-up vector exceeds `COLLISION_SLOPE_THRESHOLD`.

use rp_core::constants::COLLISION_SLOPE_THRESHOLD;

/// One bit per vertex. `true` = passable.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionBitmap {
    pub width: u32,
    pub length: u32,
    bits: Vec<bool>,
}

impl CollisionBitmap {
    pub fn new(width: u32, length: u32, bits: Vec<bool>) -> Self {
        assert_eq!(bits.len(), (width * length) as usize);
        Self { width, length, bits }
    }

    pub fn all_passable(width: u32, length: u32) -> Self {
        Self::new(width, length, vec![true; (width * length) as usize])
    }

    /// Derives a bitmap from per-vertex normals (row-major, same layout as
    /// the heights they came from).
    pub fn from_normals(width: u32, length: u32, normals_y: &[f32]) -> Self {
        let bits = normals_y.iter().map(|&ny| ny > COLLISION_SLOPE_THRESHOLD).collect();
        Self::new(width, length, bits)
    }

    fn index(&self, x: i64, z: i64) -> usize {
        let wx = x.rem_euclid(self.width as i64) as usize;
        let wz = z.rem_euclid(self.length as i64) as usize;
        wz * self.width as usize + wx
    }

    pub fn is_passable(&self, x: i64, z: i64) -> bool {
        self.bits[self.index(x, z)]
    }

    pub fn set(&mut self, x: i64, z: i64, passable: bool) {
        let idx = self.index(x, z);
        self.bits[idx] = passable;
    }

    pub fn as_bits(&self) -> &[bool] {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_normals_threshold() {
        let normals_y = vec![0.9, 0.5, 0.86, 0.84];
        let bm = CollisionBitmap::from_normals(2, 2, &normals_y);
        assert!(bm.is_passable(0, 0));
        assert!(!bm.is_passable(1, 0));
        assert!(bm.is_passable(0, 1));
        assert!(!bm.is_passable(1, 1));
    }

    #[test]
    fn test_index_wraps() {
        let bm = CollisionBitmap::all_passable(4, 4);
        assert!(bm.is_passable(-1, -1));
        assert!(bm.is_passable(4, 4));
    }
}

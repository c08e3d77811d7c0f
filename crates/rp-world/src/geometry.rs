//! Toroidal-world vector geometry: shortest-path direction between two
//! points that may need to wrap around either axis.

use rp_core::types::{Vec3, WorldDims};

/// The direction from `from` to `to`, picking whichever of the nine
/// candidate translations of `to` (itself, plus one world-width/length
/// shift in each of the eight surrounding directions) is nearest.
pub fn direction_to(from: Vec3, to: Vec3, dims: WorldDims, ignore_height: bool) -> Vec3 {
    let mut best = to.sub(&from);
    if ignore_height {
        best.y = 0.0;
    }
    let mut best_len = best.length();

    for dz in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            let candidate = Vec3::new(
                to.x + dx as f32 * dims.width,
                to.y,
                to.z + dz as f32 * dims.length,
            );
            let mut dir = candidate.sub(&from);
            if ignore_height {
                dir.y = 0.0;
            }
            let len = dir.length();
            if len < best_len {
                best = dir;
                best_len = len;
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_wraps_to_nearest() {
        let dims = WorldDims::new(100.0, 100.0);
        let from = Vec3::new(5.0, 0.0, 5.0);
        let to = Vec3::new(95.0, 0.0, 5.0);
        let dir = direction_to(from, to, dims, true);
        // Wrapping the other way is only 10 units, vs 90 direct.
        assert!((dir.x + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_direction_within_half_extent() {
        let dims = WorldDims::new(100.0, 200.0);
        let from = Vec3::new(0.0, 0.0, 0.0);
        let to = Vec3::new(37.0, 0.0, 150.0);
        let dir = direction_to(from, to, dims, true);
        assert!(dir.length() <= (dims.width.min(dims.length)) / 2.0 + 1e-3);
    }
}

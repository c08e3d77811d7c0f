//! Spatial partitioning. The world is divided into fixed-size square
//! patches; entities register with whichever patch contains their resolved
//! position, and patch-local scans (nearest-entity, obstacle lookup) never
//! need to touch the full entity store.

use rp_core::constants::PATCH_SIZE;
use rp_core::types::EntityId;

/// A single spatial partition cell. Holds the ids of entities currently
/// registered in it; membership is maintained by the Position system's
/// deferred resolver, never by the patch itself.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    pub origin_x: f32,
    pub origin_z: f32,
    entities: Vec<EntityId>,
}

impl Patch {
    pub fn new(origin_x: f32, origin_z: f32) -> Self {
        Self {
            origin_x,
            origin_z,
            entities: Vec::new(),
        }
    }

    pub fn add_entity(&mut self, id: EntityId) {
        self.entities.push(id);
    }

    pub fn remove_entity(&mut self, id: EntityId) {
        self.entities.retain(|&e| e != id);
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }
}

/// Partitions a `width x length` world into `PATCH_SIZE`-sided square
/// patches, wrapping at the edges exactly as the world's coordinates do.
#[derive(Debug, Clone)]
pub struct PatchManager {
    patch_width: i32,
    patch_length: i32,
    world_width: f32,
    world_length: f32,
    patches: Vec<Patch>,
}

impl PatchManager {
    pub fn new(world_width: f32, world_length: f32) -> Self {
        let patch_width = (world_width / PATCH_SIZE) as i32;
        let patch_length = (world_length / PATCH_SIZE) as i32;
        let mut patches = Vec::with_capacity((patch_width * patch_length) as usize);
        for z in 0..patch_length {
            for x in 0..patch_width {
                patches.push(Patch::new(x as f32 * PATCH_SIZE, z as f32 * PATCH_SIZE));
            }
        }
        Self {
            patch_width,
            patch_length,
            world_width,
            world_length,
            patches,
        }
    }

    pub fn world_width(&self) -> f32 {
        self.world_width
    }

    pub fn world_length(&self) -> f32 {
        self.world_length
    }

    pub fn patch_width(&self) -> i32 {
        self.patch_width
    }

    pub fn patch_length(&self) -> i32 {
        self.patch_length
    }

    fn patch_index(&self, patch_x: i32, patch_z: i32) -> usize {
        let wx = patch_x.rem_euclid(self.patch_width);
        let wz = patch_z.rem_euclid(self.patch_length);
        (wz * self.patch_width + wx) as usize
    }

    /// Resolves the patch containing world-space (x, z).
    pub fn get_patch(&self, x: f32, z: f32) -> &Patch {
        let px = (x / PATCH_SIZE).floor() as i32;
        let pz = (z / PATCH_SIZE).floor() as i32;
        &self.patches[self.patch_index(px, pz)]
    }

    pub fn get_patch_id(&self, x: f32, z: f32) -> u32 {
        let px = (x / PATCH_SIZE).floor() as i32;
        let pz = (z / PATCH_SIZE).floor() as i32;
        self.patch_index(px, pz) as u32
    }

    pub fn patch_by_id(&self, id: u32) -> &Patch {
        &self.patches[id as usize]
    }

    pub fn patch_by_id_mut(&mut self, id: u32) -> &mut Patch {
        &mut self.patches[id as usize]
    }

    pub fn get_patch_mut(&mut self, x: f32, z: f32) -> &mut Patch {
        let px = (x / PATCH_SIZE).floor() as i32;
        let pz = (z / PATCH_SIZE).floor() as i32;
        let idx = self.patch_index(px, pz);
        &mut self.patches[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_index_wraps() {
        let mgr = PatchManager::new(128.0, 128.0);
        assert_eq!(mgr.patch_width(), 4);
        let id_a = mgr.get_patch_id(-1.0, -1.0);
        let id_b = mgr.get_patch_id(127.0, 127.0);
        assert_eq!(id_a, id_b);
    }

    #[test]
    fn test_entity_migration() {
        let mut mgr = PatchManager::new(64.0, 64.0);
        let id = EntityId::new(rp_core::types::PlayerNo(1), 1).unwrap();
        let old_patch_id = mgr.get_patch_id(1.0, 1.0);
        mgr.patch_by_id_mut(old_patch_id).add_entity(id);
        assert_eq!(mgr.patch_by_id(old_patch_id).entities(), &[id]);

        let new_patch_id = mgr.get_patch_id(40.0, 40.0);
        assert_ne!(old_patch_id, new_patch_id);
        mgr.patch_by_id_mut(old_patch_id).remove_entity(id);
        mgr.patch_by_id_mut(new_patch_id).add_entity(id);
        assert!(mgr.patch_by_id(old_patch_id).entities().is_empty());
        assert_eq!(mgr.patch_by_id(new_patch_id).entities(), &[id]);
    }
}

//! Entity manager: owns the hecs world plus the id-indexed bookkeeping that
//! the rest of the simulation needs to stay deterministic across peers.
//!
//! hecs does not promise that iterating a query visits entities in
//! insertion order, and entities migrate between archetypes as components
//! are added and removed — so no query can be trusted as "the" canonical
//! per-tick order. `by_id`, a `BTreeMap`, is that canonical order: every
//! system that must visit entities in ascending `EntityId` order (see
//! `rp_core::enums::COMPONENT_KINDS`'s doc comment) iterates `ids_in_order`
//! rather than a hecs query directly.

use std::collections::{BTreeMap, HashMap};

use hecs::{Entity as HecsEntity, World};
use serde::{Deserialize, Serialize};

use rp_core::commands::generate_entity_id;
use rp_core::types::{EntityId, PlayerNo};

use crate::error::{SimError, SimResult};

/// Local bookkeeping component carrying the name of the template an entity
/// was created from. Not part of `rp_core::enums::ComponentKind` — this is
/// pure housekeeping for `EntitySnapshot::template_name`, not simulation
/// state any order/command cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template(pub String);

/// Indexes live entities by `EntityId` and tracks per-player id allocation
/// and deferred destruction.
pub struct EntityManager {
    world: World,
    by_id: BTreeMap<EntityId, HecsEntity>,
    by_entity: HashMap<HecsEntity, EntityId>,
    next_counter: HashMap<PlayerNo, u32>,
    pending_destroy: Vec<EntityId>,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            by_id: BTreeMap::new(),
            by_entity: HashMap::new(),
            next_counter: HashMap::new(),
            pending_destroy: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Allocates the next id for `player_no` without registering an entity.
    /// Fails once that player's 24-bit counter is exhausted.
    pub fn allocate_id(&mut self, player_no: PlayerNo) -> SimResult<EntityId> {
        let counter = self.next_counter.entry(player_no).or_insert(0);
        let id = generate_entity_id(player_no, *counter)
            .ok_or_else(|| SimError::Invariant(format!("entity id counter exhausted for player {}", player_no.0)))?;
        *counter += 1;
        Ok(id)
    }

    /// Registers a freshly spawned hecs entity under `id`. `id` may be
    /// explicit (network-originated) rather than freshly allocated by
    /// `allocate_id`; in that case the player's counter is advanced past it
    /// so a later local `allocate_id` never collides.
    pub fn register(&mut self, id: EntityId, entity: HecsEntity) {
        let counter = self.next_counter.entry(id.player_no()).or_insert(0);
        if id.counter() >= *counter {
            *counter = id.counter() + 1;
        }
        self.by_id.insert(id, entity);
        self.by_entity.insert(entity, id);
    }

    pub fn get(&self, id: EntityId) -> Option<HecsEntity> {
        self.by_id.get(&id).copied()
    }

    pub fn id_of(&self, entity: HecsEntity) -> Option<EntityId> {
        self.by_entity.get(&entity).copied()
    }

    /// Defers destruction to the start of the next tick, after all of the
    /// current tick's component updates have run — this is what keeps a
    /// system safe from invalidating its own or a sibling's query mid-tick.
    pub fn destroy(&mut self, id: EntityId) {
        if self.by_id.contains_key(&id) {
            self.pending_destroy.push(id);
        }
    }

    pub fn flush_destroyed(&mut self) {
        for id in self.pending_destroy.drain(..) {
            if let Some(entity) = self.by_id.remove(&id) {
                self.by_entity.remove(&entity);
                let _ = self.world.despawn(entity);
            }
        }
    }

    /// Live entities in ascending `EntityId` order — the only iteration
    /// order any cross-peer-deterministic system may rely on.
    pub fn ids_in_order(&self) -> impl Iterator<Item = (EntityId, HecsEntity)> + '_ {
        self.by_id.iter().map(|(&id, &e)| (id, e))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_id_increments_counter() {
        let mut mgr = EntityManager::new();
        let player = PlayerNo(3);
        let a = mgr.allocate_id(player).unwrap();
        let b = mgr.allocate_id(player).unwrap();
        assert_eq!(a.counter(), 0);
        assert_eq!(b.counter(), 1);
        assert_eq!(a.player_no(), player);
    }

    #[test]
    fn test_register_advances_counter_past_explicit_id() {
        let mut mgr = EntityManager::new();
        let player = PlayerNo(1);
        let explicit = EntityId::new(player, 50).unwrap();
        let entity = mgr.world_mut().spawn(());
        mgr.register(explicit, entity);

        let next = mgr.allocate_id(player).unwrap();
        assert_eq!(next.counter(), 51);
    }

    #[test]
    fn test_destroy_is_deferred_until_flush() {
        let mut mgr = EntityManager::new();
        let player = PlayerNo(1);
        let id = mgr.allocate_id(player).unwrap();
        let entity = mgr.world_mut().spawn(());
        mgr.register(id, entity);

        mgr.destroy(id);
        assert!(mgr.get(id).is_some(), "destroy should not remove immediately");
        mgr.flush_destroyed();
        assert!(mgr.get(id).is_none());
        assert_eq!(mgr.len(), 0);
    }

    #[test]
    fn test_ids_in_order_is_sorted() {
        let mut mgr = EntityManager::new();
        let player = PlayerNo(2);
        let mut ids = Vec::new();
        for _ in 0..5 {
            let id = mgr.allocate_id(player).unwrap();
            let entity = mgr.world_mut().spawn(());
            mgr.register(id, entity);
            ids.push(id);
        }
        let observed: Vec<EntityId> = mgr.ids_in_order().map(|(id, _)| id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(observed, sorted);
    }
}

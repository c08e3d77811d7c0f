//! Cleanup system: flushes entities that other systems marked for
//! destruction this tick (dead projectiles, destroyed units) so the next
//! tick's systems never see them.

use crate::entity::EntityManager;

pub fn run(entities: &mut EntityManager) {
    entities.flush_destroyed();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::components::PositionComponent;
    use rp_core::types::PlayerNo;

    #[test]
    fn test_run_flushes_pending_destroys() {
        let mut entities = EntityManager::new();
        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((PositionComponent::default(),));
        entities.register(id, entity);

        entities.destroy(id);
        assert!(entities.get(id).is_some());

        run(&mut entities);
        assert!(entities.get(id).is_none());
    }
}

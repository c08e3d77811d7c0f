//! Snapshot system: builds the read-only `GameStateSnapshot` published at
//! the end of each tick. Never modifies the world.

use rp_core::components::{DamageableComponent, OwnableComponent, PositionComponent, SelectableComponent};
use rp_core::enums::GamePhase;
use rp_core::events::Alert;
use rp_core::state::{EntitySnapshot, GameStateSnapshot, PlayerSnapshot};
use rp_core::types::SimTime;

use crate::entity::{EntityManager, Template};
use crate::players::Player;

pub fn build_snapshot(
    entities: &EntityManager,
    time: SimTime,
    phase: GamePhase,
    players: &[Player],
    alerts: Vec<Alert>,
) -> GameStateSnapshot {
    let world = entities.world();

    let entity_snapshots = entities
        .ids_in_order()
        .filter_map(|(id, entity)| {
            let template_name = world.get::<&Template>(entity).ok()?.0.clone();
            let pos = world.get::<&PositionComponent>(entity).ok()?;
            let (owner, color) = world
                .get::<&OwnableComponent>(entity)
                .map(|o| (Some(o.owner), Some(o.color)))
                .unwrap_or((None, None));
            let selected = world.get::<&SelectableComponent>(entity).map(|s| s.selected).unwrap_or(false);
            let health = world.get::<&DamageableComponent>(entity).ok().map(|d| d.health);

            Some(EntitySnapshot {
                id,
                template_name,
                pos: pos.pos,
                dir: pos.dir,
                owner,
                color,
                selected,
                health,
            })
        })
        .collect();

    let player_snapshots = players
        .iter()
        .map(|p| PlayerSnapshot {
            player_no: p.player_no,
            display_name: p.display_name.clone(),
            color: p.color,
            connected: p.connected,
            ready_to_start: p.ready_to_start,
        })
        .collect();

    GameStateSnapshot { time, phase, entities: entity_snapshots, players: player_snapshots, alerts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::types::{Color, PlayerNo, Vec3};

    #[test]
    fn test_build_snapshot_includes_present_components_only() {
        let mut entities = EntityManager::new();
        let id = entities.allocate_id(PlayerNo(1)).unwrap();
        let entity = entities.world_mut().spawn((
            Template("rifleman".to_string()),
            PositionComponent { pos: Vec3::new(1.0, 0.0, 2.0), ..PositionComponent::default() },
            OwnableComponent { owner: PlayerNo(1), color: Color::from_rgba(1, 2, 3, 255) },
        ));
        entities.register(id, entity);

        let snapshot = build_snapshot(&entities, SimTime::default(), GamePhase::Active, &[], Vec::new());

        assert_eq!(snapshot.entities.len(), 1);
        let e = &snapshot.entities[0];
        assert_eq!(e.template_name, "rifleman");
        assert_eq!(e.pos, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(e.owner, Some(PlayerNo(1)));
        assert_eq!(e.health, None, "entity with no DamageableComponent reports no health");
    }

    #[test]
    fn test_build_snapshot_orders_entities_by_id_and_includes_players() {
        let mut entities = EntityManager::new();
        let second = entities.allocate_id(PlayerNo(2)).unwrap();
        let first = entities.allocate_id(PlayerNo(1)).unwrap();

        let e2 = entities.world_mut().spawn((Template("b".into()), PositionComponent::default()));
        entities.register(second, e2);
        let e1 = entities.world_mut().spawn((Template("a".into()), PositionComponent::default()));
        entities.register(first, e1);

        let players = vec![Player::local(PlayerNo(1), "Alice", Color::default())];
        let snapshot = build_snapshot(&entities, SimTime::default(), GamePhase::Active, &players, Vec::new());

        assert!(snapshot.entities[0].id < snapshot.entities[1].id);
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].display_name, "Alice");
    }
}

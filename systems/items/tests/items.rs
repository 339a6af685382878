use std::time::Duration;

use invaders_core::{
    Command, DestructionCause, Difficulty, Event, GameSettings, GameState, ItemBoxId, ItemKind,
    LevelPhase, Loadout, ShipType,
};
use invaders_system_items::{resolve_effect, Config, Items};
use invaders_world::{self as world, query, World};

fn playing_world(settings: GameSettings) -> World {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartLevel {
            settings,
            state: GameState::new(ShipType::StarDefender, 3),
            difficulty: Difficulty::Easy,
            loadout: Loadout::default(),
            bonus_life: false,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(6),
        },
        &mut events,
    );
    assert_eq!(query::phase(&world), LevelPhase::Playing);
    world
}

#[test]
fn line_bomb_clears_the_lowest_row() {
    let mut world = playing_world(GameSettings::new(5, 3, 60, 2500));
    let effect = resolve_effect(
        ItemKind::LineBomb,
        &query::level_context(&world),
        &query::formation_view(&world),
    );

    let mut events = Vec::new();
    world::apply(&mut world, Command::ApplyItem { effect }, &mut events);

    let destroyed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyDestroyed { slot, cause, .. } => {
                assert_eq!(*cause, DestructionCause::LineBomb);
                Some(slot.row())
            }
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, vec![2; 5]);
    assert!(events.contains(&Event::ItemApplied {
        kind: ItemKind::LineBomb,
        score: 50,
        ships_destroyed: 5,
    }));
    assert_eq!(query::formation_view(&world).alive().count(), 10);
}

#[test]
fn bomb_destroys_nine_ships_of_a_full_formation() {
    let mut world = playing_world(GameSettings::new(6, 4, 60, 2500));
    let effect = resolve_effect(
        ItemKind::Bomb,
        &query::level_context(&world),
        &query::formation_view(&world),
    );
    let mut events = Vec::new();
    world::apply(&mut world, Command::ApplyItem { effect }, &mut events);
    assert_eq!(query::game_state(&world).ships_destroyed, 9);
    assert_eq!(query::formation_view(&world).alive().count(), 15);
}

#[test]
fn collected_boxes_turn_into_applied_items() {
    let mut world = playing_world(GameSettings::default());
    let mut items = Items::new(Config::new(0xfeed));

    let mut applied = Vec::new();
    for index in 0..12 {
        let mut commands = Vec::new();
        items.handle(
            &[Event::ItemBoxCollected {
                item_box: ItemBoxId::new(index),
            }],
            &query::level_context(&world),
            &query::formation_view(&world),
            &mut commands,
        );
        assert_eq!(commands.len(), 1);

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        applied.extend(events.into_iter().filter_map(|event| match event {
            Event::ItemApplied { kind, .. } => Some(kind),
            _ => None,
        }));
    }
    assert_eq!(applied.len(), 12);
    assert!(query::shot_count(&world) <= 3);
}

use invaders_core::{
    Command, Difficulty, Event, GameSettings, GameState, LevelPhase, Loadout, ShipType,
    FRAME_DURATION,
};
use invaders_system_obstacles::{Config, Obstacles};
use invaders_world::{self as world, query, World};

fn start(world: &mut World, level: u32, events: &mut Vec<Event>) {
    let state = GameState {
        level,
        ..GameState::new(ShipType::StarDefender, 3)
    };
    world::apply(
        world,
        Command::StartLevel {
            settings: GameSettings::default(),
            state,
            difficulty: Difficulty::Normal,
            loadout: Loadout::default(),
            bonus_life: false,
        },
        events,
    );
}

fn pump(world: &mut World, system: &mut Obstacles, events: &mut Vec<Event>) -> Vec<Command> {
    let mut commands = Vec::new();
    system.handle(events, &query::level_context(world), &mut commands);
    events.clear();
    for command in &commands {
        world::apply(world, command.clone(), events);
    }
    commands
}

#[test]
fn level_start_lays_out_webs_and_blocks() {
    let mut world = World::default();
    let mut system = Obstacles::new(Config::new(0xabc));
    let mut events = Vec::new();
    start(&mut world, 4, &mut events);
    let _ = pump(&mut world, &mut system, &mut events);

    assert_eq!(query::webs(&world).len(), 2);
    assert_eq!(query::blocks(&world).len(), 2);
    assert!(query::blockers(&world).is_empty());
}

#[test]
fn first_blocker_arrives_after_play_begins() {
    let mut world = World::default();
    let mut system = Obstacles::new(Config::new(0xabc));
    let mut events = Vec::new();
    start(&mut world, 3, &mut events);
    let _ = pump(&mut world, &mut system, &mut events);

    let mut playing_frames = 0u32;
    let mut first_blocker = None;
    for _ in 0..60 * 40 {
        world::apply(&mut world, Command::Tick { dt: FRAME_DURATION }, &mut events);
        if query::phase(&world) == LevelPhase::Playing {
            playing_frames += 1;
        }
        let launched = pump(&mut world, &mut system, &mut events)
            .iter()
            .any(|command| matches!(command, Command::SpawnBlocker { .. }));
        assert!(query::blockers(&world).len() <= 1, "level three allows a single blocker");
        if launched && first_blocker.is_none() {
            first_blocker = Some(playing_frames);
        }
    }

    let first_blocker = first_blocker.expect("a blocker launches within the interval");
    assert!(first_blocker > 1, "blocker launched on the first playing frame");
    assert!(first_blocker <= 60 * 24 + 1);
}

#[test]
fn identical_seeds_lay_out_identical_levels() {
    let layout = |seed| {
        let mut world = World::default();
        let mut system = Obstacles::new(Config::new(seed));
        let mut events = Vec::new();
        start(&mut world, 9, &mut events);
        pump(&mut world, &mut system, &mut events)
    };
    assert_eq!(layout(77), layout(77));
}

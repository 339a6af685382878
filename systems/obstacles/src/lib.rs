#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic obstacle system that lays out webs and blocks and launches
//! blockers.
//!
//! Webs and blocks are laid out once when a level starts. Blockers only appear
//! from level three onwards; they drift across the playfield hiding the
//! formation from view and never interact with bullets.

use std::time::Duration;

use invaders_core::{
    Arena, Command, Event, Extent, Hitbox, Lateral, LevelContext, LevelPhase, Position,
    VariableCooldown,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WEB_WIDTH: i32 = 24;
const WEB_LIFT: i32 = 70;
const BLOCK_EXTENT: Extent = Extent::new(40, 14);
const FORMATION_TOP: i32 = 100;
const FORMATION_ROW_REACH: i32 = 48;
const PLAYER_ZONE: i32 = 190;
const PLACEMENT_ATTEMPTS: usize = 32;
const BLOCKER_INTERVAL: Duration = Duration::from_millis(10_000);
const BLOCKER_VARIANCE: Duration = Duration::from_millis(14_000);
const BLOCKER_TOP_MARGIN: i32 = 25;
const BLOCKER_BOTTOM_MARGIN: i32 = 65;
const BLOCKER_MAX_ANGLE: f32 = 180.0;

/// Configuration parameters required to construct the obstacle system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits web, block and blocker commands.
#[derive(Debug)]
pub struct Obstacles {
    rng: ChaCha8Rng,
    blocker_cooldown: VariableCooldown,
}

impl Obstacles {
    /// Creates a new obstacle system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            blocker_cooldown: VariableCooldown::new(BLOCKER_INTERVAL, BLOCKER_VARIANCE),
        }
    }

    /// Consumes events and the level context to emit obstacle commands.
    pub fn handle(&mut self, events: &[Event], context: &LevelContext, out: &mut Vec<Command>) {
        for event in events {
            if let Event::LevelStarted { level } = event {
                self.lay_out(*level, context, out);
            }
        }

        if context.phase != LevelPhase::Playing {
            return;
        }

        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        let _ = self.blocker_cooldown.tick(elapsed);

        if context.blocker_count < max_blockers(context.level)
            && self.blocker_cooldown.is_finished()
        {
            out.push(self.launch_blocker(context.arena));
            self.blocker_cooldown.reset_with(self.rng.gen());
        }
    }

    fn lay_out(&mut self, level: u32, context: &LevelContext, out: &mut Vec<Command>) {
        self.blocker_cooldown = VariableCooldown::new(BLOCKER_INTERVAL, BLOCKER_VARIANCE);
        self.blocker_cooldown.reset_with(self.rng.gen());
        let arena = context.arena;
        let web_count = 1 + level / 3;
        let webs = (0..web_count)
            .map(|_| {
                let x = (self.rng.gen::<f64>() * f64::from(arena.width())) as i32 - WEB_WIDTH;
                Position::new(x.max(0), arena.height() - WEB_LIFT)
            })
            .collect();
        out.push(Command::SpawnWebs { positions: webs });

        let formation_rows = i32::try_from(context.settings.formation_height).unwrap_or(i32::MAX);
        let top = FORMATION_TOP.saturating_add(
            formation_rows
                .saturating_sub(1)
                .saturating_mul(FORMATION_ROW_REACH),
        );
        let bottom = arena.height() - PLAYER_ZONE;
        let blocks = self.place_blocks(level / 2, arena, top, bottom);
        out.push(Command::SpawnBlocks { positions: blocks });
    }

    fn place_blocks(&mut self, count: u32, arena: Arena, top: i32, bottom: i32) -> Vec<Position> {
        let x_span = (arena.width() - BLOCK_EXTENT.width()).max(1);
        let y_span = (bottom - top - BLOCK_EXTENT.height()).max(1);

        let mut placed: Vec<Position> = Vec::new();
        for _ in 0..count {
            for _ in 0..PLACEMENT_ATTEMPTS {
                let candidate = Position::new(
                    self.rng.gen_range(0..x_span),
                    top + self.rng.gen_range(0..y_span),
                );
                let hitbox = Hitbox::new(candidate, BLOCK_EXTENT);
                let overlapping = placed
                    .iter()
                    .any(|other| hitbox.overlaps(&Hitbox::new(*other, BLOCK_EXTENT)));
                if !overlapping {
                    placed.push(candidate);
                    break;
                }
            }
        }
        placed
    }

    fn launch_blocker(&mut self, arena: Arena) -> Command {
        let heading = if self.rng.gen() {
            Lateral::Left
        } else {
            Lateral::Right
        };
        let y_span = (arena.height() - BLOCKER_TOP_MARGIN - BLOCKER_BOTTOM_MARGIN).max(1);
        Command::SpawnBlocker {
            heading,
            y: BLOCKER_TOP_MARGIN + self.rng.gen_range(0..y_span),
            angle: self.rng.gen_range(0.0..BLOCKER_MAX_ANGLE),
        }
    }
}

/// Number of blockers allowed on screen at once during `level`.
#[must_use]
pub const fn max_blockers(level: u32) -> usize {
    match level {
        0..=2 => 0,
        3..=5 => 1,
        6..=10 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_core::{GameSettings, FRAME_DURATION};

    fn context(level: u32, phase: LevelPhase) -> LevelContext {
        LevelContext {
            level,
            phase,
            settings: GameSettings::new(5, 4, 60, 2500),
            ..LevelContext::default()
        }
    }

    fn layout(level: u32, seed: u64) -> (Vec<Position>, Vec<Position>) {
        let mut obstacles = Obstacles::new(Config::new(seed));
        let mut commands = Vec::new();
        obstacles.handle(
            &[Event::LevelStarted { level }],
            &context(level, LevelPhase::Countdown),
            &mut commands,
        );
        match commands.as_slice() {
            [Command::SpawnWebs { positions: webs }, Command::SpawnBlocks { positions: blocks }] => {
                (webs.clone(), blocks.clone())
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn blocker_allowance_grows_with_level() {
        assert_eq!(max_blockers(1), 0);
        assert_eq!(max_blockers(3), 1);
        assert_eq!(max_blockers(5), 1);
        assert_eq!(max_blockers(6), 2);
        assert_eq!(max_blockers(10), 2);
        assert_eq!(max_blockers(11), 3);
    }

    #[test]
    fn webs_line_the_player_lane() {
        let (webs, blocks) = layout(7, 3);
        assert_eq!(webs.len(), 3);
        assert_eq!(blocks.len(), 3);
        for web in webs {
            assert_eq!(web.y(), 580);
            assert!((0..600).contains(&web.x()));
        }
    }

    #[test]
    fn blocks_stay_between_formation_and_player_without_overlap() {
        let (_, blocks) = layout(12, 17);
        assert_eq!(blocks.len(), 6);
        for (index, block) in blocks.iter().enumerate() {
            assert!(block.y() >= 244 && block.y() + 14 <= 460, "{block:?}");
            assert!(block.x() >= 0 && block.x() + 40 <= 600, "{block:?}");
            let hitbox = Hitbox::new(*block, BLOCK_EXTENT);
            for other in &blocks[index + 1..] {
                assert!(!hitbox.overlaps(&Hitbox::new(*other, BLOCK_EXTENT)));
            }
        }
    }

    #[test]
    fn no_blockers_before_level_three() {
        let mut obstacles = Obstacles::new(Config::new(5));
        let mut commands = Vec::new();
        for _ in 0..10 {
            obstacles.handle(
                &[Event::TimeAdvanced {
                    dt: Duration::from_secs(5),
                }],
                &context(2, LevelPhase::Playing),
                &mut commands,
            );
        }
        assert!(commands.is_empty());
    }

    #[test]
    fn blockers_launch_off_screen_within_margins() {
        let mut obstacles = Obstacles::new(Config::new(5));
        let mut commands = Vec::new();
        obstacles.handle(&[], &context(3, LevelPhase::Playing), &mut commands);
        match commands.as_slice() {
            [Command::SpawnBlocker { y, angle, .. }] => {
                assert!((25..585).contains(y));
                assert!((0.0..180.0).contains(angle));
            }
            other => panic!("unexpected commands: {other:?}"),
        }

        commands.clear();
        let full = LevelContext {
            blocker_count: 1,
            ..context(3, LevelPhase::Playing)
        };
        obstacles.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(30),
            }],
            &full,
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn first_blocker_waits_for_the_armed_cooldown() {
        for seed in 0..20 {
            let mut obstacles = Obstacles::new(Config::new(seed));
            let mut commands = Vec::new();
            obstacles.handle(
                &[Event::LevelStarted { level: 3 }],
                &context(3, LevelPhase::Countdown),
                &mut commands,
            );
            let armed = obstacles.blocker_cooldown.remaining();
            assert!(!armed.is_zero(), "seed {seed}");
            assert!(armed <= BLOCKER_INTERVAL + BLOCKER_VARIANCE, "seed {seed}");

            let mut played = Duration::ZERO;
            loop {
                commands.clear();
                obstacles.handle(
                    &[Event::TimeAdvanced { dt: FRAME_DURATION }],
                    &context(3, LevelPhase::Playing),
                    &mut commands,
                );
                played += FRAME_DURATION;
                if commands
                    .iter()
                    .any(|command| matches!(command, Command::SpawnBlocker { .. }))
                {
                    break;
                }
                assert!(played < armed, "seed {seed}: cooldown elapsed without a blocker");
            }
            assert!(
                played >= armed,
                "seed {seed}: blocker after {played:?}, cooldown armed for {armed:?}"
            );
        }
    }
}

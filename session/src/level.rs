//! Frame-by-frame orchestration of a single level.

use std::time::{Duration, Instant};

use invaders_core::{
    Arena, Command, Event, GameState, LevelOutcome, LevelPhase, FRAME_DURATION,
};
use invaders_system_bonus_ship::{self as bonus_ship, BonusShipSchedule};
use invaders_system_enemy_fire::{self as enemy_fire, EnemyFire};
use invaders_system_items::{self as items, Items};
use invaders_system_obstacles::{self as obstacles, Obstacles};
use invaders_system_progression::LevelPlan;
use invaders_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::InputSource;

/// Bounds applied while running a level to completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLimits {
    /// Frames after which the level is abandoned.
    pub max_frames: Option<u64>,
    /// Whether each frame waits out its wall-clock duration.
    pub real_time: bool,
}

/// Result of running a level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReport {
    /// State reported when the level closed, or the live state if it never did.
    pub state: GameState,
    /// How the level ended, if it did.
    pub outcome: Option<LevelOutcome>,
    /// Frames simulated.
    pub frames: u64,
}

impl LevelReport {
    /// Reports whether the level closed before hitting the frame limit.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.outcome.is_some()
    }
}

/// One world driven by the pure systems, advanced a frame at a time.
#[derive(Debug)]
pub struct LevelSession {
    world: World,
    enemy_fire: EnemyFire,
    items: Items,
    obstacles: Obstacles,
    bonus_ship: BonusShipSchedule,
    events: Vec<Event>,
    commands: Vec<Command>,
    closed: Option<GameState>,
    frames: u64,
}

impl LevelSession {
    /// Lays out the planned level. Systems draw their randomness from `seed`.
    #[must_use]
    pub fn new(arena: Arena, plan: LevelPlan, seed: u64) -> Self {
        let mut seeds = ChaCha8Rng::seed_from_u64(seed);
        let mut session = Self {
            world: World::new(arena),
            enemy_fire: EnemyFire::new(enemy_fire::Config::new(seeds.gen())),
            items: Items::new(items::Config::new(seeds.gen())),
            obstacles: Obstacles::new(obstacles::Config::new(seeds.gen())),
            bonus_ship: BonusShipSchedule::new(bonus_ship::Config::new(seeds.gen())),
            events: Vec::new(),
            commands: Vec::new(),
            closed: None,
            frames: 0,
        };
        world::apply(&mut session.world, plan.into_command(), &mut session.events);
        session
    }

    /// World being simulated.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Frames simulated so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Applies the player's controls, simulates one frame and lets the systems react.
    ///
    /// Events raised by system commands are delivered to the systems together
    /// with the next frame's events.
    pub fn step(&mut self, input: &mut dyn InputSource) -> LevelPhase {
        input.next_input(&self.world).push_commands(&mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        world::apply(
            &mut self.world,
            Command::Tick { dt: FRAME_DURATION },
            &mut self.events,
        );
        self.frames += 1;

        self.pump_systems();
        self.phase()
    }

    /// Steps until the level closes or a limit is reached.
    pub fn run(&mut self, input: &mut dyn InputSource, limits: RunLimits) -> LevelReport {
        let level = query::game_state(&self.world).level;
        tracing::info!(level, "level session started");

        while self.phase() != LevelPhase::Finished {
            if limits.max_frames.is_some_and(|max| self.frames >= max) {
                tracing::warn!(level, frames = self.frames, "level abandoned at frame limit");
                break;
            }
            let started = Instant::now();
            let _ = self.step(input);
            if limits.real_time {
                pace(started.elapsed());
            }
        }

        let report = self.report();
        tracing::info!(
            level,
            frames = report.frames,
            score = report.state.score,
            lives = report.state.lives,
            outcome = ?report.outcome,
            "level session ended"
        );
        report
    }

    /// Snapshot of the level's result so far.
    #[must_use]
    pub fn report(&self) -> LevelReport {
        LevelReport {
            state: self
                .closed
                .clone()
                .unwrap_or_else(|| query::game_state(&self.world)),
            outcome: self.closed.as_ref().and(query::outcome(&self.world)),
            frames: self.frames,
        }
    }

    fn phase(&self) -> LevelPhase {
        query::phase(&self.world)
    }

    fn pump_systems(&mut self) {
        for event in &self.events {
            if let Event::LevelClosed { state } = event {
                self.closed = Some(state.clone());
            }
        }

        let context = query::level_context(&self.world);
        self.enemy_fire.handle(
            &self.events,
            &context,
            query::shooters(&self.world),
            &mut self.commands,
        );
        let formation = query::formation_view(&self.world);
        self.items
            .handle(&self.events, &context, &formation, &mut self.commands);
        self.obstacles
            .handle(&self.events, &context, &mut self.commands);
        self.bonus_ship
            .handle(&self.events, &context, &mut self.commands);

        self.events.clear();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}

fn pace(spent: Duration) {
    if let Some(remaining) = FRAME_DURATION.checked_sub(spent) {
        std::thread::sleep(remaining);
    }
}

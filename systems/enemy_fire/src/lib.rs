#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy fire system that decides when the formation shoots.
//!
//! The system arms a variable cooldown on the first playing frame of every
//! level. Each time it elapses, a random selection of shooters (the lowest
//! surviving ship of each column) opens fire and the cooldown is redrawn.

use std::time::Duration;

use invaders_core::{Command, EnemySlot, Event, LevelContext, LevelPhase, VariableCooldown};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const VARIANCE_PERCENT: u32 = 20;

/// Configuration parameters required to construct the enemy fire system.
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

/// Pure system that emits [`Command::FireEnemyVolley`] on a randomised cadence.
#[derive(Debug)]
pub struct EnemyFire {
    rng: ChaCha8Rng,
    cooldown: Option<VariableCooldown>,
}

impl EnemyFire {
    /// Creates a new enemy fire system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            cooldown: None,
        }
    }

    /// Consumes events and immutable views to emit volley commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        context: &LevelContext,
        shooters: &[EnemySlot],
        out: &mut Vec<Command>,
    ) {
        if events
            .iter()
            .any(|event| matches!(event, Event::LevelStarted { .. }))
        {
            self.cooldown = None;
        }

        if context.phase != LevelPhase::Playing {
            return;
        }

        let Some(cooldown) = self.cooldown.as_mut() else {
            self.arm(context);
            return;
        };

        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        let _ = cooldown.tick(elapsed);

        if context.time_stopped || !cooldown.is_finished() || shooters.is_empty() {
            return;
        }

        let per_level = context.level / 3 + 1;
        let count = usize::try_from(per_level)
            .unwrap_or(usize::MAX)
            .min(shooters.len());
        let selected = (0..count)
            .map(|_| shooters[self.rng.gen_range(0..shooters.len())])
            .collect();
        out.push(Command::FireEnemyVolley {
            shooters: selected,
            bullets_per_shooter: per_level,
        });

        let roll = self.rng.gen::<f64>();
        if let Some(cooldown) = self.cooldown.as_mut() {
            cooldown.reset_with(roll);
        }
    }

    fn arm(&mut self, context: &LevelContext) {
        let interval = context.settings.shooting_interval();
        let variance = interval * VARIANCE_PERCENT / 100;
        let mut cooldown = VariableCooldown::new(interval, variance);
        cooldown.reset_with(self.rng.gen());
        self.cooldown = Some(cooldown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_core::GameSettings;

    fn playing(level: u32) -> LevelContext {
        LevelContext {
            level,
            phase: LevelPhase::Playing,
            settings: GameSettings::new(4, 4, 60, 1000),
            ..LevelContext::default()
        }
    }

    fn advance(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn stays_quiet_outside_of_play() {
        let mut system = EnemyFire::new(Config::new(7));
        let shooters = [EnemySlot::new(0, 3)];
        let mut commands = Vec::new();
        let context = LevelContext {
            phase: LevelPhase::Countdown,
            ..playing(1)
        };
        system.handle(&advance(Duration::from_secs(30)), &context, &shooters, &mut commands);
        assert!(commands.is_empty());
        assert!(system.cooldown.is_none());
    }

    #[test]
    fn first_playing_frame_only_arms() {
        let mut system = EnemyFire::new(Config::new(7));
        let shooters = [EnemySlot::new(0, 3)];
        let mut commands = Vec::new();
        system.handle(&advance(Duration::from_secs(30)), &playing(1), &shooters, &mut commands);
        assert!(commands.is_empty());
        let remaining = system.cooldown.map(|cooldown| cooldown.remaining());
        assert!(remaining.is_some_and(|remaining| {
            remaining >= Duration::from_millis(800) && remaining <= Duration::from_millis(1200)
        }));
    }

    #[test]
    fn volley_size_grows_every_three_levels() {
        let mut system = EnemyFire::new(Config::new(11));
        let shooters = [
            EnemySlot::new(0, 3),
            EnemySlot::new(1, 3),
            EnemySlot::new(2, 3),
        ];
        let mut commands = Vec::new();
        system.handle(&[], &playing(7), &shooters, &mut commands);
        system.handle(&advance(Duration::from_secs(2)), &playing(7), &shooters, &mut commands);
        match commands.as_slice() {
            [Command::FireEnemyVolley {
                shooters: selected,
                bullets_per_shooter,
            }] => {
                assert_eq!(selected.len(), 3);
                assert_eq!(*bullets_per_shooter, 3);
                assert!(selected.iter().all(|slot| shooters.contains(slot)));
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn volley_is_capped_by_available_shooters() {
        let mut system = EnemyFire::new(Config::new(3));
        let shooters = [EnemySlot::new(2, 0)];
        let mut commands = Vec::new();
        system.handle(&[], &playing(12), &shooters, &mut commands);
        system.handle(&advance(Duration::from_secs(2)), &playing(12), &shooters, &mut commands);
        assert_eq!(
            commands,
            vec![Command::FireEnemyVolley {
                shooters: vec![EnemySlot::new(2, 0)],
                bullets_per_shooter: 5,
            }]
        );
    }

    #[test]
    fn time_stop_holds_fire() {
        let mut system = EnemyFire::new(Config::new(5));
        let shooters = [EnemySlot::new(0, 0)];
        let frozen = LevelContext {
            time_stopped: true,
            ..playing(1)
        };
        let mut commands = Vec::new();
        system.handle(&[], &frozen, &shooters, &mut commands);
        system.handle(&advance(Duration::from_secs(5)), &frozen, &shooters, &mut commands);
        assert!(commands.is_empty());

        system.handle(&[], &playing(1), &shooters, &mut commands);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn level_start_disarms_the_cooldown() {
        let mut system = EnemyFire::new(Config::new(5));
        let mut commands = Vec::new();
        system.handle(&[], &playing(1), &[], &mut commands);
        assert!(system.cooldown.is_some());
        let context = LevelContext {
            phase: LevelPhase::Countdown,
            ..playing(2)
        };
        system.handle(&[Event::LevelStarted { level: 2 }], &context, &[], &mut commands);
        assert!(system.cooldown.is_none());
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic bonus ship system that schedules the bonus ship and the
//! warning banner announcing it.

use std::time::Duration;

use invaders_core::{AlertLevel, Command, Event, LevelContext, LevelPhase, VariableCooldown};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const APPEARANCE_INTERVAL: Duration = Duration::from_millis(20_000);
const APPEARANCE_VARIANCE: Duration = Duration::from_millis(10_000);

/// Configuration parameters required to construct the bonus ship system.
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

/// Pure system that emits bonus ship launches and alert updates.
#[derive(Debug)]
pub struct BonusShipSchedule {
    rng: ChaCha8Rng,
    cooldown: VariableCooldown,
    alert: AlertLevel,
}

impl BonusShipSchedule {
    /// Creates a new bonus ship system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            cooldown: VariableCooldown::new(APPEARANCE_INTERVAL, APPEARANCE_VARIANCE),
            alert: AlertLevel::Calm,
        }
    }

    /// Consumes events and the level context to emit bonus ship commands.
    ///
    /// The appearance cooldown restarts with every level and only runs during
    /// play.
    pub fn handle(&mut self, events: &[Event], context: &LevelContext, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::LevelStarted { .. } => {
                    self.cooldown.reset_with(self.rng.gen());
                    self.alert = AlertLevel::Calm;
                }
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }
        if context.phase != LevelPhase::Playing {
            return;
        }
        let _ = self.cooldown.tick(elapsed);

        if context.bonus_ship_present {
            return;
        }

        if self.cooldown.is_finished() {
            out.push(Command::SpawnBonusShip);
            self.cooldown.reset_with(self.rng.gen());
            self.alert = AlertLevel::Calm;
            return;
        }

        let alert = alert_for(self.cooldown.remaining());
        if alert != self.alert {
            self.alert = alert;
            out.push(Command::SetAlert { level: alert });
        }
    }
}

/// Warning stage to show while `remaining` time is left before the bonus ship.
#[must_use]
pub fn alert_for(remaining: Duration) -> AlertLevel {
    match remaining.as_millis() {
        0 => AlertLevel::Calm,
        1..=1000 => AlertLevel::High,
        1001..=2000 => AlertLevel::Medium,
        2001..=3000 => AlertLevel::Low,
        _ => AlertLevel::Calm,
    }
}

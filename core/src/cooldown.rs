//! Simulated-time cooldowns.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Countdown measured in simulated time.
///
/// A cooldown that was never reset reports itself as finished, so freshly
/// constructed timers never block the first action they guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    duration: Duration,
    remaining: Duration,
}

impl Cooldown {
    /// Creates a finished cooldown that lasts `duration` once reset.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: Duration::ZERO,
        }
    }

    /// Creates a cooldown lasting the provided number of milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Restarts the countdown using the configured duration.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Replaces the configured duration and restarts the countdown.
    pub fn reset_to(&mut self, duration: Duration) {
        self.duration = duration;
        self.remaining = duration;
    }

    /// Advances the countdown by `dt`. Returns `true` when this tick finished it.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.remaining.is_zero() {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }

    /// Reports whether the countdown elapsed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Time left before the countdown elapses.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Duration used by the next [`Cooldown::reset`].
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// Cooldown whose duration is redrawn around a base value on every reset.
///
/// The random draw is supplied by the caller so that this crate stays free of
/// random number generators; systems pass a roll in `[0, 1)` from their own
/// seeded source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCooldown {
    base: Duration,
    variance: Duration,
    cooldown: Cooldown,
}

impl VariableCooldown {
    /// Creates a finished cooldown lasting `base ± variance` once reset.
    #[must_use]
    pub const fn new(base: Duration, variance: Duration) -> Self {
        Self {
            base,
            variance,
            cooldown: Cooldown::new(base),
        }
    }

    /// Restarts the countdown with a duration picked by `roll` in `[0, 1)`.
    ///
    /// A roll of zero yields `base - variance` (never below zero) and rolls
    /// approaching one yield `base + variance`.
    pub fn reset_with(&mut self, roll: f64) {
        let low = self.base.saturating_sub(self.variance);
        let high = self.base.saturating_add(self.variance);
        let span = high.saturating_sub(low);
        let duration = low.saturating_add(span.mul_f64(roll.clamp(0.0, 1.0)));
        self.cooldown.reset_to(duration);
    }

    /// Advances the countdown by `dt`. Returns `true` when this tick finished it.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.cooldown.tick(dt)
    }

    /// Reports whether the countdown elapsed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.cooldown.is_finished()
    }

    /// Time left before the countdown elapses.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.cooldown.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cooldown_is_finished() {
        assert!(Cooldown::from_millis(500).is_finished());
    }

    #[test]
    fn tick_reports_the_finishing_edge_once() {
        let mut cooldown = Cooldown::from_millis(100);
        cooldown.reset();
        assert!(!cooldown.tick(Duration::from_millis(60)));
        assert!(cooldown.tick(Duration::from_millis(60)));
        assert!(!cooldown.tick(Duration::from_millis(60)));
        assert!(cooldown.is_finished());
    }

    #[test]
    fn reset_to_replaces_duration() {
        let mut cooldown = Cooldown::from_millis(100);
        cooldown.reset_to(Duration::from_millis(250));
        assert_eq!(cooldown.remaining(), Duration::from_millis(250));
        assert_eq!(cooldown.duration(), Duration::from_millis(250));
    }

    #[test]
    fn variable_cooldown_spans_base_plus_minus_variance() {
        let mut cooldown =
            VariableCooldown::new(Duration::from_millis(2500), Duration::from_millis(500));
        assert!(cooldown.is_finished());
        cooldown.reset_with(0.0);
        assert_eq!(cooldown.remaining(), Duration::from_millis(2000));
        cooldown.reset_with(0.5);
        assert_eq!(cooldown.remaining(), Duration::from_millis(2500));
    }

    #[test]
    fn variable_cooldown_never_goes_negative() {
        let mut cooldown =
            VariableCooldown::new(Duration::from_millis(10_000), Duration::from_millis(14_000));
        cooldown.reset_with(0.0);
        assert!(cooldown.is_finished());
        cooldown.reset_with(0.5);
        assert_eq!(cooldown.remaining(), Duration::from_millis(12_000));
    }
}

//! Tunable difficulty parameters and their per-level scaling.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const MAX_FORMATION_WIDTH: u32 = 14;
const MAX_FORMATION_HEIGHT: u32 = 10;
const FASTEST_BASE_SPEED: i32 = -150;
const SHORTEST_SHOOTING_INTERVAL_MS: u32 = 100;

/// Difficulty selected for a campaign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Slow escalation every few levels.
    Easy,
    /// Escalation every other level, steeper from level five.
    #[default]
    Normal,
    /// Steep escalation with double formation growth from level five.
    Hard,
}

impl Difficulty {
    /// Numeric rank of the difficulty, added to every enemy point value.
    #[must_use]
    pub const fn ordinal(self) -> u32 {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
        }
    }
}

/// Parameters that shape a single level's formation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSettings {
    /// Number of columns in the enemy formation.
    pub formation_width: u32,
    /// Number of rows in the enemy formation.
    pub formation_height: u32,
    /// Frames between formation steps, offset by ten. Lower is faster.
    pub base_speed: i32,
    /// Average milliseconds between enemy volleys.
    pub shooting_interval_ms: u32,
}

impl GameSettings {
    /// Creates a new settings bundle.
    #[must_use]
    pub const fn new(
        formation_width: u32,
        formation_height: u32,
        base_speed: i32,
        shooting_interval_ms: u32,
    ) -> Self {
        Self {
            formation_width,
            formation_height,
            base_speed,
            shooting_interval_ms,
        }
    }

    /// Average time between enemy volleys.
    #[must_use]
    pub const fn shooting_interval(&self) -> Duration {
        Duration::from_millis(self.shooting_interval_ms as u64)
    }

    /// Rejects settings that cannot produce a playable level.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.formation_width == 0 || self.formation_height == 0 {
            return Err(SettingsError::EmptyFormation {
                width: self.formation_width,
                height: self.formation_height,
            });
        }
        if self.shooting_interval_ms == 0 {
            return Err(SettingsError::ZeroShootingInterval);
        }
        Ok(())
    }

    /// Derives the settings used to play `level` from the previous level's settings.
    ///
    /// Scaling is cumulative: callers feed the returned value back in for the
    /// following level. Levels that do not meet a difficulty's escalation rule
    /// return the settings unchanged.
    #[must_use]
    pub fn for_level(&self, level: u32, difficulty: Difficulty) -> Self {
        let early = level < 5;
        let escalation = match difficulty {
            Difficulty::Easy => {
                let due = (level % 3 == 0 && early) || (level % 2 == 0 && !early);
                due.then_some(Escalation::new(1, 10, 100))
            }
            Difficulty::Normal => {
                if level % 2 == 0 && early {
                    Some(Escalation::new(1, 10, 200))
                } else if !early {
                    Some(Escalation::new(1, 20, 300))
                } else {
                    None
                }
            }
            Difficulty::Hard => {
                if level % 2 == 0 && early {
                    Some(Escalation::new(1, 20, 300))
                } else if !early {
                    Some(Escalation::new(2, 20, 400))
                } else {
                    None
                }
            }
        };

        match escalation {
            Some(escalation) => escalation.apply(*self),
            None => *self,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(4, 4, 60, 2500)
    }
}

#[derive(Clone, Copy, Debug)]
struct Escalation {
    growth: u32,
    speed_step: i32,
    interval_step: u32,
}

impl Escalation {
    const fn new(growth: u32, speed_step: i32, interval_step: u32) -> Self {
        Self {
            growth,
            speed_step,
            interval_step,
        }
    }

    fn apply(self, settings: GameSettings) -> GameSettings {
        let mut next = settings;
        if next.formation_width == next.formation_height {
            if next.formation_width < MAX_FORMATION_WIDTH {
                next.formation_width += self.growth;
            }
        } else if next.formation_height < MAX_FORMATION_HEIGHT {
            next.formation_height += self.growth;
        }

        next.base_speed = if next.base_speed - self.speed_step > FASTEST_BASE_SPEED {
            next.base_speed - self.speed_step
        } else {
            FASTEST_BASE_SPEED
        };

        next.shooting_interval_ms = if next.shooting_interval_ms > self.interval_step * 2 {
            next.shooting_interval_ms - self.interval_step
        } else {
            SHORTEST_SHOOTING_INTERVAL_MS
        };
        next
    }
}

/// Errors reported when validating [`GameSettings`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// The formation would contain no ships.
    #[error("formation must have at least one column and one row (got {width}x{height})")]
    EmptyFormation {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// Enemies would fire continuously.
    #[error("shooting interval must be positive")]
    ZeroShootingInterval,
}

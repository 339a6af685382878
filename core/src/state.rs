//! Cross-level progress and the player's ship configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hull models available to the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipType {
    /// Balanced all-rounder.
    #[default]
    StarDefender,
    /// Fast hull with a rapid trigger.
    VoidReaper,
    /// Slow hull with quick bullets.
    GalacticGuardian,
    /// Slow hull with the fastest bullets and the slowest trigger.
    CosmicCruiser,
}

/// Multipliers a hull applies to the base ship statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipMultipliers {
    /// Scales horizontal movement speed.
    pub speed: f32,
    /// Scales bullet speed.
    pub bullet_speed: f32,
    /// Scales the delay between shots.
    pub shooting_interval: f32,
}

impl ShipType {
    /// Every selectable hull, in menu order.
    pub const ALL: [ShipType; 4] = [
        ShipType::StarDefender,
        ShipType::VoidReaper,
        ShipType::GalacticGuardian,
        ShipType::CosmicCruiser,
    ];

    /// Statistic multipliers applied by this hull.
    #[must_use]
    pub const fn multipliers(self) -> ShipMultipliers {
        let (speed, bullet_speed, shooting_interval) = match self {
            Self::StarDefender => (1.0, 1.0, 1.0),
            Self::VoidReaper => (1.4, 1.2, 0.4),
            Self::GalacticGuardian => (0.8, 1.5, 1.2),
            Self::CosmicCruiser => (0.8, 2.0, 1.6),
        };
        ShipMultipliers {
            speed,
            bullet_speed,
            shooting_interval,
        }
    }
}

/// Weapon upgrades bought in the shop, each in `1..=4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loadout {
    bullet_level: u8,
    shot_level: u8,
}

impl Loadout {
    /// Highest purchasable upgrade level.
    pub const MAX_LEVEL: u8 = 4;

    /// Creates a loadout, clamping both levels into `1..=4`.
    #[must_use]
    pub fn new(bullet_level: u8, shot_level: u8) -> Self {
        Self {
            bullet_level: bullet_level.clamp(1, Self::MAX_LEVEL),
            shot_level: shot_level.clamp(1, Self::MAX_LEVEL),
        }
    }

    /// Bullet speed upgrade level.
    #[must_use]
    pub const fn bullet_level(&self) -> u8 {
        self.bullet_level
    }

    /// Fire rate upgrade level.
    #[must_use]
    pub const fn shot_level(&self) -> u8 {
        self.shot_level
    }

    /// Base player bullet speed in pixels per frame. Negative values travel upward.
    #[must_use]
    pub const fn base_bullet_speed(&self) -> i32 {
        match self.bullet_level {
            2 => -7,
            3 => -9,
            4 => -10,
            _ => -6,
        }
    }

    /// Base delay between player shots.
    #[must_use]
    pub const fn base_shooting_interval(&self) -> Duration {
        let millis = match self.shot_level {
            2 => 675,
            3 => 607,
            4 => 546,
            _ => 750,
        };
        Duration::from_millis(millis)
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Progress carried from one level to the next.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Level being played, starting at one.
    pub level: u32,
    /// Accumulated score.
    pub score: u32,
    /// Hull piloted by the player.
    pub ship_type: ShipType,
    /// Lives left.
    pub lives: u32,
    /// Player bullets fired so far.
    pub bullets_shot: u32,
    /// Enemy ships destroyed so far.
    pub ships_destroyed: u32,
    /// Simulated play time, excluding countdowns.
    pub elapsed: Duration,
    /// Consecutive hits without a miss or a pause.
    pub combo: u32,
    /// Longest combo reached during the current level.
    pub max_combo: u32,
    /// Elapsed time recorded when the current level's countdown ended.
    pub lap_time: Duration,
    /// Score recorded when the current level's countdown ended.
    pub lap_score: u32,
}

impl GameState {
    /// Creates the state of a fresh campaign.
    #[must_use]
    pub fn new(ship_type: ShipType, lives: u32) -> Self {
        Self {
            level: 1,
            ship_type,
            lives,
            ..Self::default()
        }
    }

    /// State that begins the following level. The running combo does not carry over.
    #[must_use]
    pub fn next_level(&self) -> Self {
        Self {
            level: self.level + 1,
            combo: 0,
            ..self.clone()
        }
    }

    /// Percentage of fired bullets that destroyed a ship, or zero before the first shot.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.bullets_shot == 0 {
            return 0.0;
        }
        f64::from(self.ships_destroyed) / f64::from(self.bullets_shot) * 100.0
    }
}

/// Score awarded for a hit worth `points` while `combo` hits are already chained.
///
/// Each chained hit adds another tenth of the base value.
#[must_use]
pub const fn combo_score(points: u32, combo: u32) -> u32 {
    points.saturating_add(points.saturating_mul(combo) / 10)
}

//! Parameters shared by single and two-player games.

use invaders_core::{Arena, Difficulty, GameSettings, ShipType};
use serde::{Deserialize, Serialize};

use crate::{RunLimits, SessionError};

/// Parameters of a game, independent of how its frames are driven.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield dimensions.
    pub arena: Arena,
    /// Seed from which every random decision of the game derives.
    pub seed: u64,
    /// Campaign difficulty.
    pub difficulty: Difficulty,
    /// Hull piloted by the player.
    pub ship_type: ShipType,
    /// Formation settings of the first level, before level scaling.
    pub settings: GameSettings,
    /// Last level to play, if the game should stop early.
    pub max_levels: Option<u32>,
    /// Frame budget of a single level.
    pub max_frames_per_level: Option<u64>,
    /// Whether frames are paced to wall-clock time.
    pub real_time: bool,
}

impl GameConfig {
    /// Rejects settings that cannot produce a playable level.
    pub fn validate(&self) -> Result<(), SessionError> {
        self.settings.validate()?;
        Ok(())
    }

    /// Limits applied to every level session of the game.
    #[must_use]
    pub const fn run_limits(&self) -> RunLimits {
        RunLimits {
            max_frames: self.max_frames_per_level,
            real_time: self.real_time,
        }
    }

    /// Seed for the systems of `level` played by the player with `lane` index.
    #[must_use]
    pub fn level_seed(&self, lane: u64, level: u32) -> u64 {
        const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
        self.seed
            .wrapping_add(lane.wrapping_mul(GOLDEN_GAMMA.rotate_left(17)))
            .wrapping_add(u64::from(level).wrapping_mul(GOLDEN_GAMMA))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            seed: 0,
            difficulty: Difficulty::default(),
            ship_type: ShipType::default(),
            settings: GameSettings::default(),
            max_levels: None,
            max_frames_per_level: None,
            real_time: false,
        }
    }
}

//! Level-to-level progression of a single player's game.

use invaders_core::{Command, Difficulty, GameSettings, GameState, Loadout, ShipType};
use serde::{Deserialize, Serialize};

use crate::Wallet;

/// A bonus life is offered every this many levels.
pub const EXTRA_LIFE_FREQUENCY: u32 = 3;

/// Everything the world needs to start the next level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelPlan {
    /// Formation parameters scaled for the level.
    pub settings: GameSettings,
    /// State the level starts from.
    pub state: GameState,
    /// Campaign difficulty.
    pub difficulty: Difficulty,
    /// Weapon upgrades carried into the level.
    pub loadout: Loadout,
    /// Whether the player receives an extra life.
    pub bonus_life: bool,
}

impl LevelPlan {
    /// Converts the plan into the command that starts the level.
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::StartLevel {
            settings: self.settings,
            state: self.state,
            difficulty: self.difficulty,
            loadout: self.loadout,
            bonus_life: self.bonus_life,
        }
    }
}

/// Progress of one player through consecutive levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    settings: GameSettings,
    state: GameState,
    difficulty: Difficulty,
    loadout: Loadout,
    max_lives: u32,
}

impl Campaign {
    /// Starts a campaign at level one with a full set of lives.
    #[must_use]
    pub fn new(
        base: GameSettings,
        ship_type: ShipType,
        difficulty: Difficulty,
        loadout: Loadout,
        max_lives: u32,
    ) -> Self {
        let state = GameState::new(ship_type, max_lives);
        Self {
            settings: base.for_level(state.level, difficulty),
            state,
            difficulty,
            loadout,
            max_lives,
        }
    }

    /// Starts a campaign using the upgrades and lives bought into `wallet`.
    #[must_use]
    pub fn from_wallet(
        base: GameSettings,
        ship_type: ShipType,
        difficulty: Difficulty,
        wallet: &Wallet,
    ) -> Self {
        Self::new(base, ship_type, difficulty, wallet.loadout(), wallet.max_lives())
    }

    /// Level about to be played.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.state.level
    }

    /// State carried into the next level.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Settings of the level about to be played.
    #[must_use]
    pub const fn settings(&self) -> GameSettings {
        self.settings
    }

    /// Lives the campaign started with and the ceiling for bonus lives.
    #[must_use]
    pub const fn max_lives(&self) -> u32 {
        self.max_lives
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state.lives == 0
    }

    /// Plans the level about to be played.
    #[must_use]
    pub fn plan_level(&self) -> LevelPlan {
        LevelPlan {
            settings: self.settings,
            state: self.state.clone(),
            difficulty: self.difficulty,
            loadout: self.loadout,
            bonus_life: self.state.level % EXTRA_LIFE_FREQUENCY == 0
                && self.state.lives < self.max_lives,
        }
    }

    /// Records the state of a closed level and advances to the next one.
    ///
    /// Settings scale cumulatively from the previous level's values.
    pub fn record(&mut self, finished: GameState) {
        self.state = finished.next_level();
        self.settings = self.settings.for_level(self.state.level, self.difficulty);
    }
}

//! Single-player campaigns.

use invaders_core::GameState;
use invaders_system_progression::{Achievements, Campaign, Wallet};
use serde::{Deserialize, Serialize};

use crate::{GameConfig, InputSource, LevelReport, LevelSession, SessionError};

/// Why a game stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEnd {
    /// The player lost every life.
    OutOfLives,
    /// The configured last level was completed.
    LevelCap,
    /// A level ran out of frames before it closed.
    FrameLimit,
}

/// Levels played by one player and the state they ended with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRun {
    campaign: Campaign,
    lane: u64,
    levels: Vec<LevelReport>,
    end: Option<GameEnd>,
}

impl PlayerRun {
    /// Prepares a run for the player in `lane`, with lives and upgrades from `wallet`.
    #[must_use]
    pub fn new(config: &GameConfig, wallet: &Wallet, lane: u64) -> Self {
        Self {
            campaign: Campaign::from_wallet(
                config.settings,
                config.ship_type,
                config.difficulty,
                wallet,
            ),
            lane,
            levels: Vec::new(),
            end: None,
        }
    }

    /// Reports whether another level can be played.
    #[must_use]
    pub const fn can_continue(&self) -> bool {
        self.end.is_none()
    }

    /// Why the run stopped, once it did.
    #[must_use]
    pub const fn end(&self) -> Option<GameEnd> {
        self.end
    }

    /// Reports of every level played, in order.
    #[must_use]
    pub fn levels(&self) -> &[LevelReport] {
        &self.levels
    }

    /// State at the end of the last level played.
    #[must_use]
    pub fn final_state(&self) -> GameState {
        self.levels
            .last()
            .map_or_else(|| self.campaign.state().clone(), |report| report.state.clone())
    }

    /// Plays the next level and records it.
    ///
    /// Play time and perfect-stage progress are credited to `achievements`.
    pub fn play_level(
        &mut self,
        config: &GameConfig,
        input: &mut dyn InputSource,
        achievements: &mut Achievements,
    ) {
        if !self.can_continue() {
            return;
        }

        let plan = self.campaign.plan_level();
        let level = plan.state.level;
        let started_elapsed = plan.state.elapsed;
        let seed = config.level_seed(self.lane, level);
        let mut session = LevelSession::new(config.arena, plan, seed);
        let report = session.run(input, config.run_limits());

        if !report.is_closed() {
            self.end = Some(GameEnd::FrameLimit);
            self.levels.push(report);
            return;
        }

        achievements.record_level(
            report.state.elapsed.saturating_sub(started_elapsed),
            &report.state,
            self.campaign.max_lives(),
        );
        self.campaign.record(report.state.clone());
        self.levels.push(report);

        if self.campaign.is_over() {
            self.end = Some(GameEnd::OutOfLives);
        } else if config.max_levels.is_some_and(|cap| level >= cap) {
            self.end = Some(GameEnd::LevelCap);
        }
    }
}

/// Outcome of a finished single-player game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// State at the end of the last level played.
    pub final_state: GameState,
    /// Reports of every level played, in order.
    pub levels: Vec<LevelReport>,
    /// Why the game stopped.
    pub end: GameEnd,
    /// Coins converted from the score.
    pub score_coins: u32,
    /// Coins paid out by achievements.
    pub achievement_coins: u32,
    /// Wallet after the game's earnings were deposited.
    pub wallet: Wallet,
    /// Achievement progress after the game.
    pub achievements: Achievements,
}

/// Campaign played level after level by a single player.
#[derive(Debug)]
pub struct SinglePlayerGame {
    config: GameConfig,
    wallet: Wallet,
    achievements: Achievements,
}

impl SinglePlayerGame {
    /// Prepares a game with persisted `wallet` and `achievements`.
    pub fn new(
        config: GameConfig,
        wallet: Wallet,
        achievements: Achievements,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            wallet,
            achievements,
        })
    }

    /// Plays levels until the player runs out of lives or a limit is reached,
    /// then settles coins and achievements.
    pub fn play(mut self, input: &mut dyn InputSource) -> GameSummary {
        let mut run = PlayerRun::new(&self.config, &self.wallet, 0);
        while run.can_continue() {
            run.play_level(&self.config, input, &mut self.achievements);
        }

        let final_state = run.final_state();
        self.achievements.record_game(&final_state);
        let score_coins = self.wallet.coins_for_score(final_state.score);
        if score_coins > 0 {
            let _ = self.wallet.deposit(score_coins);
        }
        let achievement_coins = self.achievements.settle(&mut self.wallet);
        let end = run.end().unwrap_or(GameEnd::OutOfLives);
        tracing::info!(
            score = final_state.score,
            level = final_state.level,
            ?end,
            coins = score_coins + achievement_coins,
            "game over"
        );

        GameSummary {
            final_state,
            levels: run.levels,
            end,
            score_coins,
            achievement_coins,
            wallet: self.wallet,
            achievements: self.achievements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Idle;
    use invaders_core::GameSettings;

    #[test]
    fn frame_limit_ends_the_game() {
        let config = GameConfig {
            max_frames_per_level: Some(120),
            ..GameConfig::default()
        };
        let game = SinglePlayerGame::new(config, Wallet::default(), Achievements::default())
            .expect("valid config");
        let summary = game.play(&mut Idle);
        assert_eq!(summary.end, GameEnd::FrameLimit);
        assert_eq!(summary.levels.len(), 1);
        assert_eq!(summary.final_state.level, 1);
    }

    #[test]
    fn invalid_settings_are_rejected_up_front() {
        let config = GameConfig {
            settings: GameSettings::new(4, 4, 60, 0),
            ..GameConfig::default()
        };
        assert!(SinglePlayerGame::new(config, Wallet::default(), Achievements::default()).is_err());
    }

    #[test]
    fn exhausted_runs_refuse_more_levels() {
        let config = GameConfig {
            max_frames_per_level: Some(1),
            ..GameConfig::default()
        };
        let mut run = PlayerRun::new(&config, &Wallet::default(), 0);
        let mut achievements = Achievements::default();
        run.play_level(&config, &mut Idle, &mut achievements);
        run.play_level(&config, &mut Idle, &mut achievements);
        assert_eq!(run.levels().len(), 1);
        assert!(!run.can_continue());
    }
}

//! Long-running achievements that pay out coins.

use std::time::Duration;

use invaders_core::GameState;
use serde::{Deserialize, Serialize};

use crate::Wallet;

const PLAY_TIME_GOAL: Duration = Duration::from_secs(600);
const PLAY_TIME_REWARD: u32 = 1000;
const COMBO_MILESTONES: [(u32, u32); 4] = [(10, 500), (15, 1500), (20, 2000), (25, 2500)];
const PERFECT_REWARDS: [u32; 7] = [200, 400, 800, 2000, 3000, 4000, 5000];
const FLAWLESS_FAILURE_REWARD: u32 = 1000;

/// Achievement progress kept across games.
///
/// Rewards earned by [`Achievements::record_level`] and
/// [`Achievements::record_game`] accumulate until
/// [`Achievements::settle`] moves them into a [`Wallet`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    total_play_time: Duration,
    total_score: u64,
    high_max_combo: u32,
    perfect_stage: u32,
    flawless_failure: bool,
    pending_reward: u32,
}

impl Achievements {
    /// Simulated play time summed over every recorded level.
    #[must_use]
    pub const fn total_play_time(&self) -> Duration {
        self.total_play_time
    }

    /// Score summed over every recorded game.
    #[must_use]
    pub const fn total_score(&self) -> u64 {
        self.total_score
    }

    /// Longest combo ever reached.
    #[must_use]
    pub const fn high_max_combo(&self) -> u32 {
        self.high_max_combo
    }

    /// Highest perfect stage cleared, from zero to seven.
    #[must_use]
    pub const fn perfect_stage(&self) -> u32 {
        self.perfect_stage
    }

    /// Whether a game ended without a single hit.
    #[must_use]
    pub const fn flawless_failure(&self) -> bool {
        self.flawless_failure
    }

    /// Coins earned but not yet deposited.
    #[must_use]
    pub const fn pending_reward(&self) -> u32 {
        self.pending_reward
    }

    /// Updates play time, perfect stage and combo progress after a level closes.
    ///
    /// `play_time` is the simulated time spent in the level and `finished`
    /// the state the world reported when it closed.
    pub fn record_level(&mut self, play_time: Duration, finished: &GameState, max_lives: u32) {
        let before = self.total_play_time;
        self.total_play_time = before.saturating_add(play_time);
        if before < PLAY_TIME_GOAL && self.total_play_time >= PLAY_TIME_GOAL {
            self.reward(PLAY_TIME_REWARD);
        }

        let next_stage = self.perfect_stage as usize;
        if finished.lives >= max_lives
            && next_stage < PERFECT_REWARDS.len()
            && finished.level > self.perfect_stage
        {
            self.perfect_stage += 1;
            self.reward(PERFECT_REWARDS[next_stage]);
        }

        self.record_combo(finished.max_combo);
    }

    /// Updates the total score and the flawless failure achievement after a game.
    pub fn record_game(&mut self, final_state: &GameState) {
        self.total_score = self
            .total_score
            .saturating_add(u64::from(final_state.score));
        if !self.flawless_failure && final_state.accuracy() <= 0.0 {
            self.flawless_failure = true;
            self.reward(FLAWLESS_FAILURE_REWARD);
        }
    }

    /// Deposits pending rewards into `wallet` and returns the amount moved.
    pub fn settle(&mut self, wallet: &mut Wallet) -> u32 {
        let reward = std::mem::take(&mut self.pending_reward);
        if reward > 0 {
            let _ = wallet.deposit(reward);
        }
        reward
    }

    fn record_combo(&mut self, max_combo: u32) {
        if max_combo <= self.high_max_combo {
            return;
        }
        let reward = COMBO_MILESTONES
            .iter()
            .filter(|(threshold, _)| *threshold > self.high_max_combo && *threshold <= max_combo)
            .map(|(_, coins)| coins)
            .sum();
        self.high_max_combo = max_combo;
        self.reward(reward);
    }

    fn reward(&mut self, coins: u32) {
        self.pending_reward = self.pending_reward.saturating_add(coins);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_core::ShipType;

    fn finished(level: u32, lives: u32, max_combo: u32) -> GameState {
        GameState {
            level,
            max_combo,
            ..GameState::new(ShipType::StarDefender, lives)
        }
    }

    #[test]
    fn play_time_pays_once_when_crossing_ten_minutes() {
        let mut achievements = Achievements::default();
        let state = finished(1, 1, 0);
        achievements.record_level(Duration::from_secs(590), &state, 3);
        assert_eq!(achievements.pending_reward(), 0);
        achievements.record_level(Duration::from_secs(20), &state, 3);
        assert_eq!(achievements.pending_reward(), 1000);
        achievements.record_level(Duration::from_secs(600), &state, 3);
        assert_eq!(achievements.pending_reward(), 1000);
    }

    #[test]
    fn combo_milestones_are_paid_once_each() {
        let mut achievements = Achievements::default();
        achievements.record_level(Duration::ZERO, &finished(1, 1, 12), 3);
        assert_eq!(achievements.pending_reward(), 500);
        achievements.record_level(Duration::ZERO, &finished(2, 1, 11), 3);
        assert_eq!(achievements.pending_reward(), 500);
        achievements.record_level(Duration::ZERO, &finished(3, 1, 30), 3);
        assert_eq!(achievements.pending_reward(), 500 + 1500 + 2000 + 2500);
        assert_eq!(achievements.high_max_combo(), 30);
    }

    #[test]
    fn perfect_stages_climb_one_level_at_a_time() {
        let mut achievements = Achievements::default();
        achievements.record_level(Duration::ZERO, &finished(1, 3, 0), 3);
        achievements.record_level(Duration::ZERO, &finished(1, 3, 0), 3);
        assert_eq!(achievements.perfect_stage(), 1);
        assert_eq!(achievements.pending_reward(), 200);

        achievements.record_level(Duration::ZERO, &finished(2, 2, 0), 3);
        assert_eq!(achievements.perfect_stage(), 1);

        for level in 2..=12 {
            achievements.record_level(Duration::ZERO, &finished(level, 3, 0), 3);
        }
        assert_eq!(achievements.perfect_stage(), 7);
        assert_eq!(achievements.pending_reward(), PERFECT_REWARDS.iter().sum::<u32>());
    }

    #[test]
    fn flawless_failure_requires_zero_accuracy() {
        let mut achievements = Achievements::default();
        let mut state = finished(4, 0, 0);
        state.bullets_shot = 10;
        state.ships_destroyed = 1;
        achievements.record_game(&state);
        assert!(!achievements.flawless_failure());

        state.ships_destroyed = 0;
        state.score = 0;
        achievements.record_game(&state);
        achievements.record_game(&state);
        assert!(achievements.flawless_failure());
        assert_eq!(achievements.pending_reward(), 1000);
    }

    #[test]
    fn settling_moves_rewards_into_the_wallet() {
        let mut achievements = Achievements::default();
        achievements.record_game(&finished(1, 0, 0));
        let mut wallet = Wallet::default();
        assert_eq!(achievements.settle(&mut wallet), 1000);
        assert_eq!(wallet.coins(), 1000);
        assert_eq!(achievements.settle(&mut wallet), 0);
        assert_eq!(wallet.coins(), 1000);
    }

    #[test]
    fn total_score_accumulates_across_games() {
        let mut achievements = Achievements::default();
        let mut state = finished(3, 0, 0);
        state.score = 1500;
        achievements.record_game(&state);
        achievements.record_game(&state);
        assert_eq!(achievements.total_score(), 3000);
    }
}

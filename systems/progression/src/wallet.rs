//! Coins and shop upgrades.

use invaders_core::Loadout;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_LEVEL: u8 = 1;
const MAX_LEVEL: u8 = 4;
const UPGRADE_COSTS: [u32; 3] = [2000, 4000, 8000];
const COIN_RATIOS: [f64; 4] = [0.10, 0.13, 0.16, 0.19];
const BASE_LIVES: u32 = 2;

/// Upgrades sold in the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upgrade {
    /// Faster player bullets.
    BulletSpeed,
    /// Shorter delay between player shots.
    ShotFrequency,
    /// One more life at the start of every game.
    ExtraLives,
    /// A larger share of the score converted into coins.
    CoinGain,
}

impl Upgrade {
    /// Every upgrade, in shop order.
    pub const ALL: [Upgrade; 4] = [
        Upgrade::BulletSpeed,
        Upgrade::ShotFrequency,
        Upgrade::ExtraLives,
        Upgrade::CoinGain,
    ];
}

/// Errors raised by wallet transactions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    /// Transactions must move at least one coin.
    #[error("transaction amount must be positive")]
    NonPositiveAmount,
    /// The wallet holds fewer coins than requested.
    #[error("insufficient coins: requested {requested}, available {available}")]
    InsufficientCoins {
        /// Coins the transaction needed.
        requested: u32,
        /// Coins held by the wallet.
        available: u32,
    },
    /// The upgrade already reached its highest level.
    #[error("{upgrade:?} is already at the maximum level")]
    MaxLevel {
        /// Upgrade that could not be bought.
        upgrade: Upgrade,
    },
    /// A stored upgrade level lies outside `1..=4`.
    #[error("upgrade level {level} is outside 1..=4")]
    InvalidLevel {
        /// Offending level.
        level: u8,
    },
}

/// Coins earned across games and the upgrade levels bought with them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    coins: u32,
    bullet_level: u8,
    shot_level: u8,
    lives_level: u8,
    coin_level: u8,
}

impl Wallet {
    /// Restores a wallet, rejecting upgrade levels outside `1..=4`.
    pub fn with_levels(
        coins: u32,
        bullet_level: u8,
        shot_level: u8,
        lives_level: u8,
        coin_level: u8,
    ) -> Result<Self, WalletError> {
        for level in [bullet_level, shot_level, lives_level, coin_level] {
            if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
                return Err(WalletError::InvalidLevel { level });
            }
        }
        Ok(Self {
            coins,
            bullet_level,
            shot_level,
            lives_level,
            coin_level,
        })
    }

    /// Coins currently held.
    #[must_use]
    pub const fn coins(&self) -> u32 {
        self.coins
    }

    /// Current level of `upgrade`.
    #[must_use]
    pub const fn level(&self, upgrade: Upgrade) -> u8 {
        match upgrade {
            Upgrade::BulletSpeed => self.bullet_level,
            Upgrade::ShotFrequency => self.shot_level,
            Upgrade::ExtraLives => self.lives_level,
            Upgrade::CoinGain => self.coin_level,
        }
    }

    /// Adds coins, saturating at the largest representable balance.
    pub fn deposit(&mut self, amount: u32) -> Result<u32, WalletError> {
        if amount == 0 {
            return Err(WalletError::NonPositiveAmount);
        }
        self.coins = self.coins.saturating_add(amount);
        Ok(self.coins)
    }

    /// Removes coins, refusing to overdraw the balance.
    pub fn withdraw(&mut self, amount: u32) -> Result<u32, WalletError> {
        if amount == 0 {
            return Err(WalletError::NonPositiveAmount);
        }
        if amount > self.coins {
            return Err(WalletError::InsufficientCoins {
                requested: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(self.coins)
    }

    /// Price of the next level of `upgrade`, or `None` once it is maxed out.
    #[must_use]
    pub fn upgrade_cost(&self, upgrade: Upgrade) -> Option<u32> {
        let index = usize::from(self.level(upgrade).checked_sub(MIN_LEVEL)?);
        UPGRADE_COSTS.get(index).copied()
    }

    /// Buys the next level of `upgrade` and returns the new level.
    pub fn purchase(&mut self, upgrade: Upgrade) -> Result<u8, WalletError> {
        let cost = self
            .upgrade_cost(upgrade)
            .ok_or(WalletError::MaxLevel { upgrade })?;
        let _ = self.withdraw(cost)?;
        let level = match upgrade {
            Upgrade::BulletSpeed => &mut self.bullet_level,
            Upgrade::ShotFrequency => &mut self.shot_level,
            Upgrade::ExtraLives => &mut self.lives_level,
            Upgrade::CoinGain => &mut self.coin_level,
        };
        *level += 1;
        Ok(*level)
    }

    /// Lives a new game starts with.
    #[must_use]
    pub fn max_lives(&self) -> u32 {
        u32::from(self.lives_level) + BASE_LIVES
    }

    /// Weapon upgrades the player ship carries into a level.
    #[must_use]
    pub fn loadout(&self) -> Loadout {
        Loadout::new(self.bullet_level, self.shot_level)
    }

    /// Coins earned for finishing a game with `score`, rounded to the nearest coin.
    #[must_use]
    pub fn coins_for_score(&self, score: u32) -> u32 {
        let index = usize::from(self.coin_level.saturating_sub(MIN_LEVEL));
        let ratio = COIN_RATIOS
            .get(index)
            .copied()
            .unwrap_or(COIN_RATIOS[COIN_RATIOS.len() - 1]);
        (f64::from(score) * ratio).round() as u32
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            coins: 0,
            bullet_level: MIN_LEVEL,
            shot_level: MIN_LEVEL,
            lives_level: MIN_LEVEL,
            coin_level: MIN_LEVEL,
        }
    }
}

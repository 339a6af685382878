//! TOML configuration file layered under the command-line flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use invaders_session::GameConfig;
use invaders_system_progression::Wallet;
use serde::{Deserialize, Serialize};

/// Contents of an `invaders.toml` file. Every table and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    /// Game parameters shared by both modes.
    pub(crate) game: GameConfig,
    /// Coins and upgrade levels the player starts with.
    pub(crate) wallet: WalletConfig,
}

/// Upgrade levels bought in the shop, as written in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WalletConfig {
    pub(crate) coins: u32,
    pub(crate) bullet_level: u8,
    pub(crate) shot_level: u8,
    pub(crate) lives_level: u8,
    pub(crate) coin_level: u8,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            coins: 0,
            bullet_level: 1,
            shot_level: 1,
            lives_level: 1,
            coin_level: 1,
        }
    }
}

impl WalletConfig {
    pub(crate) fn into_wallet(self) -> Result<Wallet> {
        Wallet::with_levels(
            self.coins,
            self.bullet_level,
            self.shot_level,
            self.lives_level,
            self.coin_level,
        )
        .context("invalid [wallet] table")
    }
}

impl FileConfig {
    /// Reads `path`, or falls back to defaults when no file was given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub(crate) fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("config is not valid TOML for invaders")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_core::{Difficulty, ShipType};
    use invaders_system_progression::Upgrade;

    #[test]
    fn empty_file_uses_defaults() {
        let config = FileConfig::parse("").expect("empty config parses");

        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = FileConfig::parse(
            r#"
            [game]
            seed = 42
            difficulty = "hard"
            ship_type = "void_reaper"
            max_levels = 3

            [wallet]
            coins = 500
            shot_level = 3
            "#,
        )
        .expect("config parses");

        assert_eq!(config.game.seed, 42);
        assert_eq!(config.game.difficulty, Difficulty::Hard);
        assert_eq!(config.game.ship_type, ShipType::VoidReaper);
        assert_eq!(config.game.max_levels, Some(3));
        assert!(!config.game.real_time);

        let wallet = config.wallet.into_wallet().expect("valid wallet");
        assert_eq!(wallet.coins(), 500);
        assert_eq!(wallet.level(Upgrade::ShotFrequency), 3);
        assert_eq!(wallet.level(Upgrade::BulletSpeed), 1);
    }

    #[test]
    fn out_of_range_upgrade_is_reported() {
        let config = FileConfig::parse("[wallet]\nlives_level = 9\n").expect("config parses");

        let error = config.wallet.into_wallet().expect_err("level 9 is rejected");
        assert!(error.to_string().contains("[wallet]"));
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(FileConfig::parse("[game]\ndifficulty = \"nightmare\"\n").is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = FileConfig::load(Some(Path::new("/nonexistent/invaders.toml")))
            .expect_err("missing file fails");

        assert!(error.to_string().contains("/nonexistent/invaders.toml"));
    }
}

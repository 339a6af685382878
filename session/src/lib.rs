#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame loop orchestration for Invaders games.
//!
//! A [`LevelSession`] owns one world and the pure systems that drive it and
//! advances them one frame at a time. [`SinglePlayerGame`] chains level
//! sessions through a campaign, while [`TwoPlayerGame`] runs two campaigns side
//! by side on a dedicated two-thread pool and keeps their level transitions in
//! lockstep with a [`LevelBarrier`].

mod barrier;
mod config;
mod game;
mod input;
mod level;
mod versus;

use invaders_core::SettingsError;
use thiserror::Error;

pub use barrier::LevelBarrier;
pub use config::GameConfig;
pub use game::{GameEnd, GameSummary, PlayerRun, SinglePlayerGame};
pub use input::{Autopilot, FrameInput, Idle, InputSource, Scripted};
pub use level::{LevelReport, LevelSession, RunLimits};
pub use versus::{Player, TwoPlayerGame, VersusSummary};

/// Errors raised while setting up or running a game.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configured formation settings cannot produce a playable level.
    #[error("invalid game settings: {0}")]
    InvalidSettings(#[from] SettingsError),
    /// The worker pool for a two-player game could not be created.
    #[error("failed to build the player thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// A player's level task panicked.
    #[error("player {player} task panicked: {message}")]
    PlayerPanicked {
        /// One-based number of the player whose task failed.
        player: u8,
        /// Panic payload, when it carried a message.
        message: String,
    },
}

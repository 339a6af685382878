#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Campaign progression, coin wallet and achievement bookkeeping.
//!
//! Nothing in this crate touches the world directly. A [`Campaign`] plans the
//! next level as a [`invaders_core::Command::StartLevel`] and records the
//! [`invaders_core::GameState`] the world reports once the level closes. The
//! [`Wallet`] and [`Achievements`] are persisted between games by the caller.

mod achievements;
mod campaign;
mod wallet;

pub use achievements::Achievements;
pub use campaign::{Campaign, LevelPlan, EXTRA_LIFE_FREQUENCY};
pub use wallet::{Upgrade, Wallet, WalletError};

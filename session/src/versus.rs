//! Two-player games played side by side on a dedicated thread pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use invaders_core::GameState;
use invaders_system_progression::{Achievements, Wallet};
use serde::{Deserialize, Serialize};

use crate::{GameConfig, InputSource, LevelBarrier, PlayerRun, SessionError};

/// Seat of a player in a two-player game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// The first player.
    One,
    /// The second player.
    Two,
}

impl Player {
    /// One-based player number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    const fn lane(self) -> u64 {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Outcome of a finished two-player game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersusSummary {
    /// Run of the first player.
    pub player_one: PlayerRun,
    /// Run of the second player.
    pub player_two: PlayerRun,
    /// Player with the higher score. Ties go to player one.
    pub winner: Player,
}

impl VersusSummary {
    /// Final state of the winning player.
    #[must_use]
    pub fn winner_state(&self) -> GameState {
        match self.winner {
            Player::One => self.player_one.final_state(),
            Player::Two => self.player_two.final_state(),
        }
    }
}

/// Two campaigns advancing level by level in lockstep.
#[derive(Debug)]
pub struct TwoPlayerGame {
    config: GameConfig,
    wallet: Wallet,
}

impl TwoPlayerGame {
    /// Prepares a game in which both players use the upgrades in `wallet`.
    pub fn new(config: GameConfig, wallet: Wallet) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self { config, wallet })
    }

    /// Plays both campaigns to the end.
    ///
    /// Each player's levels run as a task on a pool of exactly two threads. A
    /// player only starts the next level once both players finished the
    /// current one; a player who is out of lives waits for the other.
    pub fn play<A, B>(&self, mut first: A, mut second: B) -> Result<VersusSummary, SessionError>
    where
        A: InputSource + Send,
        B: InputSource + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .thread_name(|index| format!("invaders-player-{}", index + 1))
            .build()?;
        let barrier = LevelBarrier::new(2);

        let (player_one, player_two) = pool.install(|| {
            rayon::join(
                || self.run_player(Player::One, &mut first, &barrier),
                || self.run_player(Player::Two, &mut second, &barrier),
            )
        });
        let player_one = player_one?;
        let player_two = player_two?;

        let winner = if player_one.final_state().score >= player_two.final_state().score {
            Player::One
        } else {
            Player::Two
        };
        tracing::info!(
            winner = winner.number(),
            rounds = barrier.rounds(),
            "two-player game over"
        );
        Ok(VersusSummary {
            player_one,
            player_two,
            winner,
        })
    }

    fn run_player(
        &self,
        player: Player,
        input: &mut dyn InputSource,
        barrier: &LevelBarrier,
    ) -> Result<PlayerRun, SessionError> {
        let mut run = PlayerRun::new(&self.config, &self.wallet, player.lane());
        let mut achievements = Achievements::default();
        let mut failure = None;

        loop {
            if failure.is_none() && run.can_continue() {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    run.play_level(&self.config, &mut *input, &mut achievements);
                }));
                if let Err(payload) = outcome {
                    tracing::error!(player = player.number(), "player task panicked");
                    failure = Some(SessionError::PlayerPanicked {
                        player: player.number(),
                        message: panic_message(payload.as_ref()),
                    });
                }
            }

            let continuing = failure.is_none() && run.can_continue();
            tracing::debug!(player = player.number(), continuing, "player reached level barrier");
            if !barrier.arrive(continuing) {
                break;
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(run),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

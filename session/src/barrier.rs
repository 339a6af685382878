//! Completion barrier that keeps two players' level transitions in lockstep.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct Round {
    generation: u64,
    arrived: usize,
    continuing: bool,
    verdict: bool,
}

/// Reusable barrier where every party reports whether it can keep playing.
///
/// Each round releases all parties at once, after the last one arrives. The
/// verdict of a round is `true` while at least one party wants to continue, so
/// a party without lives keeps arriving immediately until the other finishes.
#[derive(Debug)]
pub struct LevelBarrier {
    parties: usize,
    round: Mutex<Round>,
    released: Condvar,
}

impl LevelBarrier {
    /// Creates a barrier for `parties` participants.
    #[must_use]
    pub fn new(parties: usize) -> Self {
        Self {
            parties: parties.max(1),
            round: Mutex::new(Round {
                generation: 0,
                arrived: 0,
                continuing: false,
                verdict: false,
            }),
            released: Condvar::new(),
        }
    }

    /// Blocks until every party arrived and returns whether anyone continues.
    pub fn arrive(&self, continuing: bool) -> bool {
        let mut round = self.round.lock();
        round.continuing |= continuing;
        round.arrived += 1;

        if round.arrived == self.parties {
            round.verdict = round.continuing;
            round.arrived = 0;
            round.continuing = false;
            round.generation = round.generation.wrapping_add(1);
            let verdict = round.verdict;
            drop(round);
            let _ = self.released.notify_all();
            return verdict;
        }

        let generation = round.generation;
        while round.generation == generation {
            self.released.wait(&mut round);
        }
        round.verdict
    }

    /// Rounds completed so far.
    #[must_use]
    pub fn rounds(&self) -> u64 {
        self.round.lock().generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn single_party_passes_straight_through() {
        let barrier = LevelBarrier::new(1);
        assert!(barrier.arrive(true));
        assert!(!barrier.arrive(false));
        assert_eq!(barrier.rounds(), 2);
    }

    #[test]
    fn rounds_continue_while_any_party_continues() {
        let barrier = Arc::new(LevelBarrier::new(2));
        let quitter = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rounds = 0;
                while barrier.arrive(false) {
                    rounds += 1;
                }
                rounds
            })
        };

        for remaining in (0..3).rev() {
            let verdict = barrier.arrive(remaining > 0);
            assert_eq!(verdict, remaining > 0);
        }
        assert_eq!(quitter.join().expect("quitter thread"), 2);
        assert_eq!(barrier.rounds(), 3);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic item system that drops item boxes and resolves their effects.
//!
//! Every player bullet that lands on an enemy has a chance to drop a box.
//! Shooting a box picks one of the [`ItemKind`] values at random and the
//! system translates it into a fully targeted [`ItemEffect`] for the world.

use std::time::Duration;

use invaders_core::{
    Command, DestructionCause, EnemySlot, Event, FormationView, ItemEffect, ItemKind,
    LevelContext, Position,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DROP_PROBABILITY: u32 = 30;
const DROP_OFFSET_X: i32 = 6;
const DROP_OFFSET_Y: i32 = 1;
const BOMB_SPAN: u32 = 3;
const BARRIER_WIDTH: i32 = 78;
const BARRIER_LIFT: i32 = 70;
const BARRIER_SPACING: i32 = 200;
const GHOST_DURATION: Duration = Duration::from_millis(3000);
const TIME_STOP_DURATION: Duration = Duration::from_millis(4000);
const MAX_SHOT_COUNT: u32 = 3;

/// Configuration parameters required to construct the item system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits item box and item effect commands.
#[derive(Debug)]
pub struct Items {
    rng: ChaCha8Rng,
}

impl Items {
    /// Creates a new item system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit item commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        context: &LevelContext,
        formation: &FormationView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::EnemyDamaged { position, .. }
                | Event::EnemyDestroyed {
                    position,
                    cause: DestructionCause::PlayerBullet,
                    ..
                } => {
                    if self.rng.gen_range(0..=100) <= DROP_PROBABILITY {
                        out.push(Command::SpawnItemBox {
                            position: position.offset(DROP_OFFSET_X, DROP_OFFSET_Y),
                        });
                    }
                }
                Event::ItemBoxCollected { .. } => {
                    let kind = self.select_kind(context.shot_count);
                    out.push(Command::ApplyItem {
                        effect: resolve_effect(kind, context, formation),
                    });
                }
                _ => {}
            }
        }
    }

    fn select_kind(&mut self, shot_count: u32) -> ItemKind {
        let choices = if shot_count >= MAX_SHOT_COUNT {
            &ItemKind::ALL[..ItemKind::ALL.len() - 1]
        } else {
            &ItemKind::ALL[..]
        };
        choices[self.rng.gen_range(0..choices.len())]
    }
}

/// Translates an item into the concrete effect it has on the current level.
#[must_use]
pub fn resolve_effect(
    kind: ItemKind,
    context: &LevelContext,
    formation: &FormationView,
) -> ItemEffect {
    match kind {
        ItemKind::Bomb => ItemEffect::Bomb {
            targets: bomb_targets(formation),
        },
        ItemKind::LineBomb => ItemEffect::LineBomb {
            targets: line_bomb_targets(formation),
        },
        ItemKind::Barrier => {
            let y = context.arena.height() - BARRIER_LIFT;
            let middle = context.arena.width() / 2 - BARRIER_WIDTH / 2;
            ItemEffect::Barrier {
                positions: vec![
                    Position::new(middle, y),
                    Position::new(middle - BARRIER_SPACING, y),
                    Position::new(middle + BARRIER_SPACING, y),
                ],
            }
        }
        ItemKind::Ghost => ItemEffect::Ghost {
            duration: GHOST_DURATION,
        },
        ItemKind::TimeStop => ItemEffect::TimeStop {
            duration: TIME_STOP_DURATION,
        },
        ItemKind::MultiShot => ItemEffect::MultiShot,
    }
}

/// Survivors inside the three-by-three window holding the most of them.
///
/// Windows are scanned column by column and the first one with the highest
/// count wins. Formations narrower or shorter than three use a window clamped
/// to their size.
fn bomb_targets(formation: &FormationView) -> Vec<EnemySlot> {
    let width = formation.columns().min(BOMB_SPAN);
    let height = formation.rows().min(BOMB_SPAN);
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let survivors_in = |column: u32, row: u32| {
        formation.alive().filter(move |enemy| {
            let slot = enemy.slot;
            (column..column + width).contains(&slot.column())
                && (row..row + height).contains(&slot.row())
        })
    };

    let mut best: Option<(usize, u32, u32)> = None;
    for column in 0..=formation.columns() - width {
        for row in 0..=formation.rows() - height {
            let count = survivors_in(column, row).count();
            if best.map_or(true, |(most, _, _)| count > most) {
                best = Some((count, column, row));
            }
        }
    }

    best.map(|(_, column, row)| survivors_in(column, row).map(|enemy| enemy.slot).collect())
        .unwrap_or_default()
}

/// Survivors in the lowest row that still has any.
fn line_bomb_targets(formation: &FormationView) -> Vec<EnemySlot> {
    let Some(row) = formation.alive().map(|enemy| enemy.slot.row()).max() else {
        return Vec::new();
    };
    formation
        .alive()
        .filter(|enemy| enemy.slot.row() == row)
        .map(|enemy| enemy.slot)
        .collect()
}

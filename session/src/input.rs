//! Sources of per-frame player input.

use invaders_core::{Command, Lateral};
use invaders_world::{query, World};

const AIM_TOLERANCE: i32 = 3;
const DODGE_HORIZON: i32 = 90;

/// Controls pressed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Sideways movement, if any.
    pub movement: Option<Lateral>,
    /// Whether the fire button is held.
    pub fire: bool,
}

impl FrameInput {
    /// Appends the commands this input translates into.
    pub fn push_commands(self, out: &mut Vec<Command>) {
        if let Some(direction) = self.movement {
            out.push(Command::MovePlayer { direction });
        }
        if self.fire {
            out.push(Command::FirePlayer);
        }
    }
}

/// Supplies the controls for each frame of a level.
pub trait InputSource {
    /// Controls for the frame about to be simulated.
    fn next_input(&mut self, world: &World) -> FrameInput;
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn next_input(&mut self, world: &World) -> FrameInput {
        (**self).next_input(world)
    }
}

/// Input source that never touches the controls.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl InputSource for Idle {
    fn next_input(&mut self, _world: &World) -> FrameInput {
        FrameInput::default()
    }
}

/// Replays a recorded sequence of inputs, then stays idle.
#[derive(Clone, Debug, Default)]
pub struct Scripted {
    frames: Vec<FrameInput>,
    cursor: usize,
}

impl Scripted {
    /// Creates a source replaying `frames` in order.
    #[must_use]
    pub fn new(frames: Vec<FrameInput>) -> Self {
        Self { frames, cursor: 0 }
    }

    /// Number of recorded frames not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }
}

impl InputSource for Scripted {
    fn next_input(&mut self, _world: &World) -> FrameInput {
        let input = self.frames.get(self.cursor).copied().unwrap_or_default();
        self.cursor = self.cursor.saturating_add(1);
        input
    }
}

/// Simple computer player that lines up under the lowest ships and keeps firing.
///
/// It sidesteps enemy bullets that are about to land on it and otherwise
/// chases the surviving ship closest to its own column.
#[derive(Clone, Copy, Debug, Default)]
pub struct Autopilot;

impl InputSource for Autopilot {
    fn next_input(&mut self, world: &World) -> FrameInput {
        let player = query::player(world);
        if player.destroyed {
            return FrameInput {
                movement: None,
                fire: true,
            };
        }

        let center = player.position.x() + player.extent.width() / 2;
        let left = player.position.x();
        let right = left + player.extent.width();

        let threat = query::bullets(world).into_iter().find(|bullet| {
            let below = player.position.y() - bullet.position.y();
            let bullet_right = bullet.position.x() + bullet.extent.width();
            bullet.hostile
                && (0..DODGE_HORIZON).contains(&below)
                && bullet.position.x() < right
                && bullet_right > left
        });
        if let Some(bullet) = threat {
            let bullet_center = bullet.position.x() + bullet.extent.width() / 2;
            let arena = query::arena(world);
            let escape = if bullet_center >= center && left > player.extent.width() {
                Lateral::Left
            } else if right < arena.width() - player.extent.width() {
                Lateral::Right
            } else {
                Lateral::Left
            };
            return FrameInput {
                movement: Some(escape),
                fire: false,
            };
        }

        let formation = query::formation_view(world);
        let lowest = formation.alive().map(|enemy| enemy.slot.row()).max();
        let target = formation
            .alive()
            .filter(|enemy| Some(enemy.slot.row()) == lowest)
            .map(|enemy| enemy.position.x() + enemy.extent.width() / 2)
            .min_by_key(|x| x.abs_diff(center));

        let movement = target.and_then(|x| {
            if x < center - AIM_TOLERANCE {
                Some(Lateral::Left)
            } else if x > center + AIM_TOLERANCE {
                Some(Lateral::Right)
            } else {
                None
            }
        });
        FrameInput {
            movement,
            fire: player.reload_remaining.is_zero(),
        }
    }
}

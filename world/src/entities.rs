//! Playfield entities other than the enemy formation.

use std::time::Duration;

use invaders_core::{
    Arena, BarrierId, BlockId, BlockerId, BulletId, Cooldown, Extent, Hitbox, ItemBoxId, Lateral,
    Loadout, Position, ShipType,
};

pub(crate) const PLAYER_EXTENT: Extent = Extent::new(26, 16);
pub(crate) const BULLET_EXTENT: Extent = Extent::new(6, 10);
pub(crate) const BARRIER_EXTENT: Extent = Extent::new(78, 22);
pub(crate) const ITEM_BOX_EXTENT: Extent = Extent::new(14, 14);
pub(crate) const WEB_EXTENT: Extent = Extent::new(24, 16);
pub(crate) const BLOCK_EXTENT: Extent = Extent::new(40, 14);
pub(crate) const BLOCKER_EXTENT: Extent = Extent::new(164, 162);
pub(crate) const BONUS_SHIP_EXTENT: Extent = Extent::new(32, 14);

/// Points awarded for the bonus ship before combo scaling.
pub(crate) const BONUS_SHIP_POINTS: u32 = 100;

const PLAYER_BASE_SPEED: f32 = 2.0;
const PLAYER_LANE_OFFSET: i32 = 70;
const PLAYER_DESTRUCTION: Duration = Duration::from_millis(1000);
const SHOT_SPREAD: i32 = 12;
const WEB_REACH: i32 = 12;
const ITEM_BOX_GRACE: Duration = Duration::from_millis(100);
const BARRIER_HEALTH: u32 = 1;
const BLOCKER_SPEED: f32 = 1.5;
const BLOCKER_SPIN: f32 = 0.2;
const BLOCKER_MARGIN: f32 = 300.0;
const BONUS_SHIP_START: Position = Position::new(-32, 60);
const BONUS_SHIP_SPEED: i32 = 2;
const BONUS_SHIP_EXPLOSION: Duration = Duration::from_millis(500);

/// The player's ship.
#[derive(Clone, Debug)]
pub(crate) struct PlayerShip {
    pub(crate) position: Position,
    speed: i32,
    bullet_speed: i32,
    trigger: Cooldown,
    destruction: Cooldown,
    pub(crate) in_web: bool,
}

impl PlayerShip {
    pub(crate) fn new(arena: Arena, ship_type: ShipType, loadout: Loadout) -> Self {
        let multipliers = ship_type.multipliers();
        let interval_ms = (loadout.base_shooting_interval().as_millis() as f32
            * multipliers.shooting_interval)
            .round() as u64;
        Self {
            position: Position::new(arena.width() / 2, arena.height() - PLAYER_LANE_OFFSET),
            speed: (PLAYER_BASE_SPEED * multipliers.speed).round() as i32,
            bullet_speed: (loadout.base_bullet_speed() as f32 * multipliers.bullet_speed).round()
                as i32,
            trigger: Cooldown::new(Duration::from_millis(interval_ms)),
            destruction: Cooldown::new(PLAYER_DESTRUCTION),
            in_web: false,
        }
    }

    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, PLAYER_EXTENT)
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        !self.destruction.is_finished()
    }

    pub(crate) fn destroy(&mut self) {
        self.destruction.reset();
    }

    pub(crate) fn reload_remaining(&self) -> Duration {
        self.trigger.remaining()
    }

    pub(crate) fn tick(&mut self, dt: Duration) {
        let _ = self.trigger.tick(dt);
        let _ = self.destruction.tick(dt);
    }

    /// Slides the ship sideways unless the move would cross the playfield border.
    ///
    /// Border checks use the full speed while webs halve the distance covered.
    pub(crate) fn slide(&mut self, direction: Lateral, arena: Arena) -> bool {
        let blocked = match direction {
            Lateral::Right => {
                self.position.x() + PLAYER_EXTENT.width() + self.speed > arena.width() - 1
            }
            Lateral::Left => self.position.x() - self.speed < 1,
        };
        if blocked {
            return false;
        }
        let distance = if self.in_web {
            self.speed / 2
        } else {
            self.speed
        };
        let dx = match direction {
            Lateral::Right => distance,
            Lateral::Left => -distance,
        };
        self.position = self.position.offset(dx, 0);
        true
    }

    /// Refreshes the web status against the provided web positions.
    pub(crate) fn check_webs<'a>(&mut self, webs: impl IntoIterator<Item = &'a Web>) {
        let x = self.position.x();
        self.in_web = webs
            .into_iter()
            .any(|web| (x - web.position.x()).abs() < WEB_REACH);
    }

    /// Pulls the trigger, returning the bullet origins when the ship has reloaded.
    pub(crate) fn fire(&mut self, shot_count: u32) -> Option<Vec<Position>> {
        if !self.trigger.is_finished() {
            return None;
        }
        self.trigger.reset();
        let center = self.position.x() + PLAYER_EXTENT.width() / 2;
        let count = shot_count.max(1) as i32;
        let origins = (0..count)
            .map(|index| {
                let offset = (2 * index - (count - 1)) * SHOT_SPREAD / 2;
                Position::new(
                    center + offset - BULLET_EXTENT.width() / 2,
                    self.position.y(),
                )
            })
            .collect();
        Some(origins)
    }

    pub(crate) fn bullet_speed(&self) -> i32 {
        self.bullet_speed
    }
}

/// Bullet in flight. Positive speeds travel downward and belong to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Bullet {
    pub(crate) id: BulletId,
    pub(crate) position: Position,
    pub(crate) speed: i32,
}

impl Bullet {
    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, BULLET_EXTENT)
    }

    pub(crate) fn is_hostile(&self) -> bool {
        self.speed > 0
    }
}

/// Shield raised by the barrier item; absorbs enemy bullets.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Barrier {
    pub(crate) id: BarrierId,
    pub(crate) position: Position,
    pub(crate) health: u32,
}

impl Barrier {
    pub(crate) fn new(id: BarrierId, position: Position) -> Self {
        Self {
            id,
            position,
            health: BARRIER_HEALTH,
        }
    }

    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, BARRIER_EXTENT)
    }
}

/// Pickup dropped by a destroyed enemy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ItemBox {
    pub(crate) id: ItemBoxId,
    pub(crate) position: Position,
    grace: Cooldown,
}

impl ItemBox {
    pub(crate) fn new(id: ItemBoxId, position: Position) -> Self {
        let mut grace = Cooldown::new(ITEM_BOX_GRACE);
        grace.reset();
        Self {
            id,
            position,
            grace,
        }
    }

    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, ITEM_BOX_EXTENT)
    }

    /// Boxes ignore bullets during their first 100 ms.
    pub(crate) fn is_collectable(&self) -> bool {
        self.grace.is_finished()
    }

    pub(crate) fn tick(&mut self, dt: Duration) {
        let _ = self.grace.tick(dt);
    }
}

/// Ground hazard that slows the player.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Web {
    pub(crate) position: Position,
}

/// Static obstacle that absorbs player bullets until the formation crushes it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Block {
    pub(crate) id: BlockId,
    pub(crate) position: Position,
}

impl Block {
    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, BLOCK_EXTENT)
    }
}

/// Rotating sprite that drifts across the playfield and hides part of it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Blocker {
    pub(crate) id: BlockerId,
    pub(crate) x: f32,
    pub(crate) y: i32,
    pub(crate) heading: Lateral,
    pub(crate) angle: f32,
}

impl Blocker {
    pub(crate) fn launch(id: BlockerId, heading: Lateral, y: i32, angle: f32, arena: Arena) -> Self {
        let x = match heading {
            Lateral::Left => arena.width() as f32 + BLOCKER_MARGIN,
            Lateral::Right => -BLOCKER_MARGIN,
        };
        Self {
            id,
            x,
            y,
            heading,
            angle,
        }
    }

    /// Reports whether the blocker drifted past the far margin.
    pub(crate) fn has_departed(&self, arena: Arena) -> bool {
        match self.heading {
            Lateral::Left => self.x < -BLOCKER_MARGIN,
            Lateral::Right => self.x > arena.width() as f32 + BLOCKER_MARGIN,
        }
    }

    pub(crate) fn drift(&mut self) {
        match self.heading {
            Lateral::Left => self.x -= BLOCKER_SPEED,
            Lateral::Right => self.x += BLOCKER_SPEED,
        }
        self.angle = (self.angle + BLOCKER_SPIN) % 360.0;
    }
}

/// Bonus ship crossing the top of the playfield.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BonusShip {
    pub(crate) position: Position,
    pub(crate) destroyed: bool,
    explosion: Cooldown,
}

impl BonusShip {
    pub(crate) fn launch() -> Self {
        Self {
            position: BONUS_SHIP_START,
            destroyed: false,
            explosion: Cooldown::new(BONUS_SHIP_EXPLOSION),
        }
    }

    pub(crate) fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, BONUS_SHIP_EXTENT)
    }

    pub(crate) fn destroy(&mut self) {
        self.destroyed = true;
        self.explosion.reset();
    }

    pub(crate) fn tick(&mut self, dt: Duration) {
        let _ = self.explosion.tick(dt);
    }

    pub(crate) fn advance(&mut self) {
        if !self.destroyed {
            self.position = self.position.offset(BONUS_SHIP_SPEED, 0);
        }
    }

    /// Reports whether the explosion finished playing.
    pub(crate) fn is_wreck_cleared(&self) -> bool {
        self.destroyed && self.explosion.is_finished()
    }

    pub(crate) fn has_escaped(&self, arena: Arena) -> bool {
        !self.destroyed && self.position.x() > arena.width()
    }
}

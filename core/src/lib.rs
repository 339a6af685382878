#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Invaders engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views such as [`FormationView`] and [`LevelContext`], and
//! respond exclusively with new command batches.

mod cooldown;
mod geometry;
mod settings;
mod state;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use cooldown::{Cooldown, VariableCooldown};
pub use geometry::{Arena, Extent, Hitbox, Position};
pub use settings::{Difficulty, GameSettings, SettingsError};
pub use state::{combo_score, GameState, Loadout, ShipMultipliers, ShipType};

/// Simulated duration of a single frame at sixty frames per second.
pub const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the world with a freshly laid out level.
    StartLevel {
        /// Formation parameters for the level.
        settings: GameSettings,
        /// Progress carried in from the previous level.
        state: GameState,
        /// Campaign difficulty, added to enemy point values.
        difficulty: Difficulty,
        /// Weapon upgrades bought in the shop.
        loadout: Loadout,
        /// Whether the player receives an extra life before the level begins.
        bonus_life: bool,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player ship slide one step sideways.
    MovePlayer {
        /// Direction of travel.
        direction: Lateral,
    },
    /// Requests that the player ship fire if its trigger has recovered.
    FirePlayer,
    /// Requests that the listed formation shooters open fire.
    FireEnemyVolley {
        /// Shooters firing the volley. A shooter may appear more than once.
        shooters: Vec<EnemySlot>,
        /// Bullets released by each listed shooter.
        bullets_per_shooter: u32,
    },
    /// Drops an item box at the provided location.
    SpawnItemBox {
        /// Upper-left corner of the new box.
        position: Position,
    },
    /// Resolves the effect of a collected item box.
    ApplyItem {
        /// Effect to apply, with any targets already chosen.
        effect: ItemEffect,
    },
    /// Lays spider webs along the player's lane.
    SpawnWebs {
        /// Upper-left corner of each web.
        positions: Vec<Position>,
    },
    /// Places bullet-absorbing blocks between the formation and the player.
    SpawnBlocks {
        /// Upper-left corner of each block.
        positions: Vec<Position>,
    },
    /// Launches a rotating blocker that obstructs the player's view.
    SpawnBlocker {
        /// Direction the blocker drifts across the playfield.
        heading: Lateral,
        /// Vertical coordinate of the blocker's upper edge.
        y: i32,
        /// Initial rotation in degrees.
        angle: f32,
    },
    /// Launches the bonus ship from the left edge.
    SpawnBonusShip,
    /// Updates the bonus ship warning shown to the player.
    SetAlert {
        /// Warning stage to display.
        level: AlertLevel,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a level was laid out and its countdown began.
    LevelStarted {
        /// Level number that started.
        level: u32,
    },
    /// Announces that the countdown ended and the player gained control.
    CountdownFinished {
        /// Level number that became playable.
        level: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player ship fired.
    PlayerFired {
        /// Number of bullets released by the shot.
        bullets: u32,
    },
    /// Reports that an enemy bullet struck the player ship.
    PlayerHit {
        /// Lives left after the hit.
        lives: u32,
    },
    /// Confirms that formation shooters released a volley.
    EnemyVolleyFired {
        /// Number of bullets released.
        bullets: u32,
    },
    /// Reports that the formation took a step.
    FormationAdvanced {
        /// Heading used for the step.
        heading: FormationHeading,
    },
    /// Reports that the formation changed heading after reaching a boundary.
    FormationTurned {
        /// Heading before the turn.
        from: FormationHeading,
        /// Heading after the turn.
        to: FormationHeading,
    },
    /// Reports that a player bullet hit an enemy without destroying it.
    EnemyDamaged {
        /// Grid slot of the enemy.
        slot: EnemySlot,
        /// Position of the enemy when it was hit.
        position: Position,
        /// Hits the enemy can still absorb.
        health: u32,
    },
    /// Reports that an enemy ship was destroyed.
    EnemyDestroyed {
        /// Grid slot of the enemy.
        slot: EnemySlot,
        /// Position of the enemy when it was destroyed.
        position: Position,
        /// Points awarded for the destruction before combo scaling.
        points: u32,
        /// What destroyed the ship.
        cause: DestructionCause,
    },
    /// Announces that the bonus ship entered the playfield.
    BonusShipAppeared,
    /// Reports that the player shot down the bonus ship.
    BonusShipDestroyed {
        /// Score awarded, including combo scaling.
        score: u32,
    },
    /// Reports that the bonus ship left the playfield unharmed.
    BonusShipEscaped,
    /// Confirms that an item box was dropped.
    ItemBoxDropped {
        /// Identifier assigned to the box.
        item_box: ItemBoxId,
        /// Upper-left corner of the box.
        position: Position,
    },
    /// Reports that the player shot an item box.
    ItemBoxCollected {
        /// Identifier of the collected box.
        item_box: ItemBoxId,
    },
    /// Confirms that an item effect took hold.
    ItemApplied {
        /// Item that was applied.
        kind: ItemKind,
        /// Score earned from ships the item destroyed.
        score: u32,
        /// Ships the item destroyed.
        ships_destroyed: u32,
    },
    /// Reports that a barrier absorbed its last enemy bullet.
    BarrierDestroyed {
        /// Identifier of the destroyed barrier.
        barrier: BarrierId,
    },
    /// Reports that a block absorbed a player bullet.
    BulletBlocked {
        /// Identifier of the block.
        block: BlockId,
    },
    /// Reports that the formation flattened a block.
    BlockCrushed {
        /// Identifier of the crushed block.
        block: BlockId,
    },
    /// Confirms that a blocker started drifting across the playfield.
    BlockerSpawned {
        /// Identifier assigned to the blocker.
        blocker: BlockerId,
    },
    /// Reports that a blocker drifted off the playfield.
    BlockerDeparted {
        /// Identifier of the departed blocker.
        blocker: BlockerId,
    },
    /// Reports that the running combo dropped back to zero.
    ComboReset {
        /// Combo length before the reset.
        combo: u32,
    },
    /// Reports that the bonus ship warning changed.
    AlertChanged {
        /// Warning stage now displayed.
        level: AlertLevel,
    },
    /// Reports that the level ended; the world keeps simulating until it closes.
    LevelFinished {
        /// How the level ended.
        outcome: LevelOutcome,
    },
    /// Reports that the level closed and its final state is available.
    LevelClosed {
        /// Progress at the moment the level closed, end-of-level bonus included.
        state: GameState,
    },
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to a bullet in flight.
    BulletId
);
identifier!(
    /// Unique identifier assigned to an item box.
    ItemBoxId
);
identifier!(
    /// Unique identifier assigned to a barrier.
    BarrierId
);
identifier!(
    /// Unique identifier assigned to a block obstacle.
    BlockId
);
identifier!(
    /// Unique identifier assigned to a blocker.
    BlockerId
);

/// Location of an enemy within the formation grid.
///
/// Slots are stable for the lifetime of a level: destroying a ship never
/// renumbers its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemySlot {
    column: u32,
    row: u32,
}

impl EnemySlot {
    /// Creates a new slot from its column and row.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index, growing to the right.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index, growing downward.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Sideways direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lateral {
    /// Toward decreasing x.
    Left,
    /// Toward increasing x.
    Right,
}

/// Heading of the enemy formation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationHeading {
    /// Sliding toward the right edge.
    Right,
    /// Sliding toward the left edge.
    Left,
    /// Descending toward the player.
    Down,
}

/// Enemy ship class, determined by the row a ship starts in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    /// Bottom half of the formation.
    A,
    /// Upper-middle rows.
    B,
    /// Rows between the top fifth and the top three tenths.
    C,
    /// Rows between the top tenth and the top fifth.
    D,
    /// Topmost tenth of the formation.
    E,
}

impl EnemyClass {
    /// Classifies `row` within a formation `rows` tall.
    #[must_use]
    pub fn for_row(row: u32, rows: u32) -> Self {
        let proportion = f64::from(row) / f64::from(rows.max(1));
        if proportion < 0.1 {
            Self::E
        } else if proportion < 0.2 {
            Self::D
        } else if proportion < 0.3 {
            Self::C
        } else if proportion < 0.5 {
            Self::B
        } else {
            Self::A
        }
    }

    /// Points awarded for destroying a ship of this class before level scaling.
    #[must_use]
    pub const fn base_points(self) -> u32 {
        match self {
            Self::A => 10,
            Self::B => 20,
            Self::C => 30,
            Self::D => 40,
            Self::E => 50,
        }
    }
}

/// Items that can drop from destroyed enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Destroys the densest three-by-three block of enemies.
    Bomb,
    /// Destroys the lowest occupied formation row.
    LineBomb,
    /// Raises three barriers above the player.
    Barrier,
    /// Makes the player briefly immune to enemy bullets.
    Ghost,
    /// Freezes the formation briefly.
    TimeStop,
    /// Adds a bullet to every player shot.
    MultiShot,
}

impl ItemKind {
    /// Every item, in selection order.
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Bomb,
        ItemKind::LineBomb,
        ItemKind::Barrier,
        ItemKind::Ghost,
        ItemKind::TimeStop,
        ItemKind::MultiShot,
    ];
}

/// Fully resolved item effect ready for the world to apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Destroys the listed enemies.
    Bomb {
        /// Enemies caught in the blast.
        targets: Vec<EnemySlot>,
    },
    /// Destroys the listed row of enemies.
    LineBomb {
        /// Enemies in the bombed row.
        targets: Vec<EnemySlot>,
    },
    /// Replaces all barriers with new ones at the listed positions.
    Barrier {
        /// Upper-left corner of each barrier.
        positions: Vec<Position>,
    },
    /// Grants invulnerability.
    Ghost {
        /// How long the effect lasts.
        duration: Duration,
    },
    /// Freezes the formation.
    TimeStop {
        /// How long the effect lasts.
        duration: Duration,
    },
    /// Adds one bullet per shot, up to three.
    MultiShot,
}

impl ItemEffect {
    /// Item that produced this effect.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Bomb { .. } => ItemKind::Bomb,
            Self::LineBomb { .. } => ItemKind::LineBomb,
            Self::Barrier { .. } => ItemKind::Barrier,
            Self::Ghost { .. } => ItemKind::Ghost,
            Self::TimeStop { .. } => ItemKind::TimeStop,
            Self::MultiShot => ItemKind::MultiShot,
        }
    }
}

/// Reason an enemy ship was destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestructionCause {
    /// A player bullet landed the final hit.
    PlayerBullet,
    /// A bomb item.
    Bomb,
    /// A line bomb item.
    LineBomb,
}

/// Lifecycle of a single level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Pre-level countdown; input is ignored and the formation rests.
    #[default]
    Countdown,
    /// Regular play.
    Playing,
    /// The level ended and the world lingers before closing.
    Finishing,
    /// The level closed; its final state is available.
    Finished,
}

/// How a level ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// Every enemy ship was destroyed.
    Cleared,
    /// The player ran out of lives.
    Defeated,
}

/// Bonus ship warning shown to the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    /// No warning.
    #[default]
    Calm,
    /// Three seconds or less until the bonus ship appears.
    Low,
    /// Two seconds or less.
    Medium,
    /// One second or less.
    High,
}

impl AlertLevel {
    /// Banner text displayed for the warning stage.
    #[must_use]
    pub const fn banner(self) -> &'static str {
        match self {
            Self::Calm => "",
            Self::Low => "--! ALERT !--",
            Self::Medium => "-!! ALERT !!-",
            Self::High => "!!! ALERT !!!",
        }
    }
}

/// Read-only snapshot of a single enemy ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Grid slot of the ship.
    pub slot: EnemySlot,
    /// Ship class.
    pub class: EnemyClass,
    /// Upper-left corner of the ship.
    pub position: Position,
    /// Size of the ship.
    pub extent: Extent,
    /// Hits the ship can absorb before the next one destroys it.
    pub health: u32,
    /// Points awarded when the ship is destroyed.
    pub points: u32,
    /// Whether the ship was destroyed and is only showing its explosion.
    pub exploding: bool,
}

/// Read-only view of the enemy formation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationView {
    columns: u32,
    rows: u32,
    enemies: Vec<EnemySnapshot>,
}

impl FormationView {
    /// Creates a view over the provided snapshots, sorted by slot.
    #[must_use]
    pub fn new(columns: u32, rows: u32, mut enemies: Vec<EnemySnapshot>) -> Self {
        enemies.sort_by_key(|enemy| enemy.slot);
        Self {
            columns,
            rows,
            enemies,
        }
    }

    /// Number of columns the formation started with.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows the formation started with.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Iterator over every present ship, including explosions, ordered by slot.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.enemies.iter()
    }

    /// Iterator over ships that can still be hit.
    pub fn alive(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.enemies.iter().filter(|enemy| !enemy.exploding)
    }

    /// Retrieves the ship occupying `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: EnemySlot) -> Option<&EnemySnapshot> {
        self.enemies
            .binary_search_by_key(&slot, |enemy| enemy.slot)
            .ok()
            .and_then(|index| self.enemies.get(index))
    }
}

/// Level-wide facts that pure systems consult every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelContext {
    /// Level being played.
    pub level: u32,
    /// Campaign difficulty.
    pub difficulty: Difficulty,
    /// Current lifecycle phase.
    pub phase: LevelPhase,
    /// Settings the level was started with.
    pub settings: GameSettings,
    /// Playfield dimensions.
    pub arena: Arena,
    /// Bullets released per player shot.
    pub shot_count: u32,
    /// Whether the formation is frozen by a time-stop item.
    pub time_stopped: bool,
    /// Whether the bonus ship is on screen.
    pub bonus_ship_present: bool,
    /// Number of blockers drifting across the playfield.
    pub blocker_count: usize,
}

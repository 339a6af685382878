#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Invaders adapters.
//!
//! Adapters translate world snapshots into a [`Scene`] expressed in playfield
//! pixels and hand it to a [`RenderingBackend`]. The crate ships a terminal
//! backend that rasterises scenes onto a character grid.

mod text;

use anyhow::Result as AnyResult;
use glam::Vec2;
use invaders_core::{AlertLevel, EnemyClass};
use std::{error::Error, fmt, time::Duration};

pub use text::{TextBackend, TextCanvas};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts the color channels back to bytes, ignoring alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
            .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// Kind of object a sprite depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    /// The player's ship.
    Player,
    /// A formation ship of the given class.
    Enemy(EnemyClass),
    /// A destroyed ship that is still showing its explosion.
    Explosion,
    /// Bullet fired by the player.
    PlayerBullet,
    /// Bullet fired by the formation.
    EnemyBullet,
    /// Barrier shielding the player.
    Barrier,
    /// Item box dropped by a damaged ship.
    ItemBox,
    /// Spider web slowing the player.
    Web,
    /// Static block absorbing bullets.
    Block,
    /// Drifting blocker.
    Blocker,
    /// Bonus ship crossing the top of the playfield.
    BonusShip,
}

impl SpriteKind {
    /// Character used by text backends.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Player => '^',
            Self::Enemy(EnemyClass::A) => 'A',
            Self::Enemy(EnemyClass::B) => 'B',
            Self::Enemy(EnemyClass::C) => 'C',
            Self::Enemy(EnemyClass::D) => 'D',
            Self::Enemy(EnemyClass::E) => 'E',
            Self::Explosion => '*',
            Self::PlayerBullet => '|',
            Self::EnemyBullet => '!',
            Self::Barrier => '=',
            Self::ItemBox => '?',
            Self::Web => '#',
            Self::Block => '%',
            Self::Blocker => '@',
            Self::BonusShip => '&',
        }
    }

    /// Color the sprite is tinted with.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Player => Color::from_rgb_u8(80, 220, 120),
            Self::Enemy(EnemyClass::A) => Color::from_rgb_u8(230, 230, 230),
            Self::Enemy(EnemyClass::B) => Color::from_rgb_u8(120, 200, 255),
            Self::Enemy(EnemyClass::C) => Color::from_rgb_u8(255, 200, 80),
            Self::Enemy(EnemyClass::D) => Color::from_rgb_u8(255, 120, 200),
            Self::Enemy(EnemyClass::E) => Color::from_rgb_u8(255, 80, 80),
            Self::Explosion => Color::from_rgb_u8(255, 160, 40),
            Self::PlayerBullet => Color::from_rgb_u8(255, 255, 255),
            Self::EnemyBullet => Color::from_rgb_u8(255, 60, 60),
            Self::Barrier => Color::from_rgb_u8(90, 160, 90),
            Self::ItemBox => Color::from_rgb_u8(250, 220, 60),
            Self::Web => Color::from_rgb_u8(170, 170, 170),
            Self::Block => Color::from_rgb_u8(140, 110, 80),
            Self::Blocker => Color::from_rgb_u8(160, 90, 220),
            Self::BonusShip => Color::from_rgb_u8(255, 40, 160),
        }
    }
}

/// Axis-aligned sprite placed on the playfield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSprite {
    /// What the sprite depicts.
    pub kind: SpriteKind,
    /// Upper-left corner in playfield pixels.
    pub position: Vec2,
    /// Width and height in playfield pixels.
    pub size: Vec2,
    /// Rotation in degrees around the sprite centre.
    pub rotation: f32,
}

impl SceneSprite {
    /// Creates an unrotated sprite.
    #[must_use]
    pub const fn new(kind: SpriteKind, position: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            position,
            size,
            rotation: 0.0,
        }
    }

    /// Returns the sprite rotated by `degrees`.
    #[must_use]
    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Heads-up display values drawn above the playfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    /// Level being played.
    pub level: u32,
    /// Accumulated score.
    pub score: u32,
    /// Lives left.
    pub lives: u32,
    /// Current combo.
    pub combo: u32,
    /// Bonus ship warning.
    pub alert: AlertLevel,
    /// Whole seconds left in the countdown, while it runs.
    pub countdown: Option<u32>,
    /// Whether the ghost item protects the player.
    pub ghost: bool,
    /// Whether the formation is frozen.
    pub time_stopped: bool,
}

impl Hud {
    /// Single status line summarising the HUD.
    #[must_use]
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "LEVEL {}  SCORE {:06}  LIVES {}  COMBO {}",
            self.level, self.score, self.lives, self.combo
        );
        if self.ghost {
            line.push_str("  GHOST");
        }
        if self.time_stopped {
            line.push_str("  TIME STOP");
        }
        if self.alert != AlertLevel::Calm {
            line.push_str("  ");
            line.push_str(self.alert.banner());
        }
        if let Some(seconds) = self.countdown {
            line.push_str(&format!("  GET READY {seconds}"));
        }
        line
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Playfield width in pixels.
    pub width: f32,
    /// Playfield height in pixels.
    pub height: f32,
    /// Sprites in draw order; later sprites cover earlier ones.
    pub sprites: Vec<SceneSprite>,
    /// Status values shown above the playfield.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene covering a `width` by `height` playfield.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            sprites: Vec::new(),
            hud: Hud {
                level: 0,
                score: 0,
                lives: 0,
                combo: 0,
                alert: AlertLevel::Calm,
                countdown: None,
                ghost: false,
                time_stopped: false,
            },
        }
    }

    /// Playfield dimensions as a vector.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Appends a sprite on top of the ones already queued.
    pub fn push(&mut self, sprite: SceneSprite) {
        self.sprites.push(sprite);
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown above the first frame.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Invaders scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until `update_scene` asks it to stop.
    ///
    /// The closure receives the simulated frame delta and may replace the
    /// scene before it is rendered. It returns `false` once there is nothing
    /// left to show.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> bool;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Text canvases need at least one column and one row.
    EmptyCanvas {
        /// Requested column count.
        columns: usize,
        /// Requested row count.
        rows: usize,
    },
    /// Frames must be drawn at least every frame.
    ZeroFrameStride,
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCanvas { columns, rows } => {
                write!(
                    f,
                    "text canvas must have positive dimensions (received {columns}x{rows})"
                )
            }
            Self::ZeroFrameStride => write!(f, "frame stride must be positive"),
        }
    }
}

impl Error for RenderingError {}

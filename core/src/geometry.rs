//! Pixel-space geometry shared by every entity on the playfield.

use serde::{Deserialize, Serialize};

/// Upper-left corner of an entity expressed in screen pixels.
///
/// The origin sits at the top-left of the arena; `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position from pixel coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in pixels.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate in pixels.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position translated by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Width and height of an entity in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    width: i32,
    height: i32,
}

impl Extent {
    /// Creates a new extent.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Horizontal size in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Vertical size in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }
}

/// Axis-aligned collision box anchored at its upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hitbox {
    origin: Position,
    extent: Extent,
}

impl Hitbox {
    /// Creates a new hitbox from its origin and extent.
    #[must_use]
    pub const fn new(origin: Position, extent: Extent) -> Self {
        Self { origin, extent }
    }

    /// Upper-left corner of the box.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Size of the box.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Center of the box using integer halving on each axis.
    #[must_use]
    pub const fn center(&self) -> Position {
        Position::new(
            self.origin.x + self.extent.width / 2,
            self.origin.y + self.extent.height / 2,
        )
    }

    /// Reports whether two boxes collide.
    ///
    /// Two boxes collide when their centers are strictly closer than the sum of
    /// their half extents on both axes. Boxes that merely touch do not collide.
    #[must_use]
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        let a = self.center();
        let b = other.center();
        let reach_x = self.extent.width / 2 + other.extent.width / 2;
        let reach_y = self.extent.height / 2 + other.extent.height / 2;
        a.x.abs_diff(b.x) < reach_x.unsigned_abs() && a.y.abs_diff(b.y) < reach_y.unsigned_abs()
    }
}

/// Dimensions of the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arena {
    width: i32,
    height: i32,
}

impl Arena {
    /// Width of the classic playfield.
    pub const DEFAULT_WIDTH: i32 = 600;
    /// Height of the classic playfield.
    pub const DEFAULT_HEIGHT: i32 = 650;
    /// Vertical coordinate of the HUD separation line; bullets above it vanish.
    pub const SEPARATION_LINE: i32 = 40;

    /// Creates a playfield with the provided pixel dimensions.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Width of the playfield in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the playfield in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

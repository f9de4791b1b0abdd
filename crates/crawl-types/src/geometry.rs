//! Small geometry types as they appear in floor and room files.
//!
//! Resource files write vectors as `{ "x": .., "y": .. }` objects. [`Point`]
//! matches that layout and converts to [`glam::Vec2`] for arithmetic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An integer 2D vector, used for grid extents and grid cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vec2I {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
}

impl Vec2I {
    /// The zero vector, which is also the spawn cell of every floor grid.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a vector from its components.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Vec2I {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A float 2D point in `{x, y}` form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Point {
    /// Create a point from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convert to a [`Vec2`].
    pub const fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        p.to_vec2()
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

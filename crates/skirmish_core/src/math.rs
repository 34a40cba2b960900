//! Field geometry: integer positions, field bounds and collision boxes.
//!
//! Positions live on an integer grid. Collision footprints have half-unit
//! edges (a 5-wide box centred on a cell), so boxes use fixed-point math to
//! stay exact without touching floats.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for collision math.
pub type Fixed = I32F32;

/// Integer position in field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared planar distance. Orders candidates exactly like the
    /// Euclidean distance without a square root.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Offset this position by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Rectangular playing field, inclusive on both edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Field width.
    pub width: i32,
    /// Field height.
    pub height: i32,
}

impl Bounds {
    /// Square field of the given size.
    #[must_use]
    pub const fn square(size: i32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Whether a position lies on the field.
    #[must_use]
    pub const fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.x <= self.width && p.y >= 0 && p.y <= self.height
    }

    /// Nearest on-field position to `p`.
    #[must_use]
    pub fn clamp(&self, p: Position) -> Position {
        Position::new(p.x.clamp(0, self.width), p.y.clamp(0, self.height))
    }
}

/// Axis-aligned collision rectangle.
///
/// Always derived from a position and a footprint size, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionBox {
    /// Left edge.
    pub x: Fixed,
    /// Top edge.
    pub y: Fixed,
    /// Width.
    pub width: Fixed,
    /// Height.
    pub height: Fixed,
}

impl CollisionBox {
    /// Square box of side `size` centred on `center`.
    #[must_use]
    pub fn centered(center: Position, size: i32) -> Self {
        let side = Fixed::from_num(size);
        let half = side / Fixed::from_num(2);
        Self {
            x: Fixed::from_num(center.x) - half,
            y: Fixed::from_num(center.y) - half,
            width: side,
            height: side,
        }
    }

    /// Whether the two boxes overlap. Touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

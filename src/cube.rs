//! Unit cube positions.
//!
//! A cube is identified purely by its integer coordinates, so two cubes
//! created independently at the same position are the same cube.

use std::fmt;

use crate::direction::Direction;

/// A unit cube at integer coordinates `(x, y, z)`.
///
/// `z` is height above ground; `y` grows to the north and `x` to the east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cube {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cube {
    /// The seed position every structure grows from.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the face-adjacent position in the given direction.
    #[inline(always)]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.delta();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub const fn is_north_of(&self, other: &Cube) -> bool {
        self.y > other.y
    }

    #[inline]
    pub const fn is_south_of(&self, other: &Cube) -> bool {
        self.y < other.y
    }

    #[inline]
    pub const fn is_east_of(&self, other: &Cube) -> bool {
        self.x > other.x
    }

    #[inline]
    pub const fn is_west_of(&self, other: &Cube) -> bool {
        self.x < other.x
    }

    #[inline]
    pub const fn is_above(&self, other: &Cube) -> bool {
        self.z > other.z
    }

    #[inline]
    pub const fn is_below(&self, other: &Cube) -> bool {
        self.z < other.z
    }

    #[inline]
    pub const fn same_x(&self, other: &Cube) -> bool {
        self.x == other.x
    }

    #[inline]
    pub const fn same_y(&self, other: &Cube) -> bool {
        self.y == other.y
    }

    #[inline]
    pub const fn same_z(&self, other: &Cube) -> bool {
        self.z == other.z
    }
}

impl From<(i32, i32, i32)> for Cube {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

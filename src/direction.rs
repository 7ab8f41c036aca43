//! The six face-adjacency directions of a unit cube.
//!
//! Directions come in a canonical fixed order (`Direction::ALL`) and a
//! shuffled order drawn fresh on every call. The shuffled order is what keeps
//! repeated construction attempts from walking into the same dead end.

use rand::seq::SliceRandom;
use rand::Rng;

/// A unit offset along one axis.
///
/// North/South move along y, East/West along x and Up/Down along z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    /// All six directions in canonical order.
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// The four horizontal (side face) directions.
    pub const LATERAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Returns the `(dx, dy, dz)` unit vector.
    #[inline(always)]
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, 1, 0),
            Direction::South => (0, -1, 0),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 0, 1),
            Direction::Down => (0, 0, -1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    #[inline]
    pub const fn is_lateral(self) -> bool {
        !matches!(self, Direction::Up | Direction::Down)
    }

    /// Returns a freshly shuffled permutation of all six directions.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> [Direction; 6] {
        let mut order = Self::ALL;
        order.shuffle(rng);
        order
    }
}

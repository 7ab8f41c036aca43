//! Immutable cube structures.
//!
//! A `Structure` is a snapshot: a set of unique cube positions plus a score.
//! Growing a structure never mutates it; `add_cube` returns a new snapshot
//! with its own set, so snapshots can be handed between attempts and threads
//! without coordination.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::cube::Cube;
use crate::direction::Direction;

/// Rounds a score to two decimals, halves towards positive infinity.
///
/// Applied on every read so that comparisons are stable against
/// floating-point drift in objective functions.
#[inline]
pub fn round_score(score: f64) -> f64 {
    (score * 100.0 + 0.5).floor() / 100.0
}

/// A set of cubes paired with a score.
#[derive(Clone, Default)]
pub struct Structure {
    cubes: FxHashSet<Cube>,
    score: f64,
}

impl Structure {
    /// Creates an empty, unscored structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a structure from cube positions. Repeated positions collapse.
    pub fn from_cubes<I>(cubes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cube>,
    {
        Self {
            cubes: cubes.into_iter().map(Into::into).collect(),
            score: 0.0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    #[inline]
    pub fn contains(&self, cube: &Cube) -> bool {
        self.cubes.contains(cube)
    }

    /// Iterates over the cubes in unspecified order.
    pub fn cubes(&self) -> impl Iterator<Item = &Cube> + '_ {
        self.cubes.iter()
    }

    /// Returns the cubes ordered by `(x, y, z)`.
    pub fn sorted_cubes(&self) -> Vec<Cube> {
        let mut cubes: Vec<Cube> = self.cubes.iter().copied().collect();
        cubes.sort_unstable();
        cubes
    }

    /// The score rounded to two decimals.
    #[inline]
    pub fn score(&self) -> f64 {
        round_score(self.score)
    }

    /// The score exactly as it was attached.
    #[inline]
    pub fn raw_score(&self) -> f64 {
        self.score
    }

    /// Returns a new structure containing `cube` as well.
    ///
    /// The score carries over unchanged. Adding a cube that is already
    /// present yields an equal structure.
    pub fn add_cube(&self, cube: Cube) -> Structure {
        let mut cubes = self.cubes.clone();
        cubes.insert(cube);
        Structure {
            cubes,
            score: self.score,
        }
    }

    /// Attaches a score to this structure.
    pub fn with_score(self, score: f64) -> Structure {
        Structure { score, ..self }
    }

    /// Returns the neighbour of `cube` in `direction` if that position is occupied.
    #[inline]
    pub fn adjacent(&self, cube: &Cube, direction: Direction) -> Option<Cube> {
        let neighbor = cube.offset(direction);
        self.cubes.contains(&neighbor).then_some(neighbor)
    }

    /// True if the cube stands on the ground or on another cube.
    pub fn is_supported(&self, cube: &Cube) -> bool {
        cube.z == 0 || self.adjacent(cube, Direction::Down).is_some()
    }

    /// True if any of the six face neighbours is occupied.
    pub fn is_connected(&self, cube: &Cube) -> bool {
        Direction::ALL
            .iter()
            .any(|&direction| self.adjacent(cube, direction).is_some())
    }

    /// True if at least one of the four side faces is uncovered.
    pub fn has_free_lateral_face(&self, cube: &Cube) -> bool {
        Direction::LATERAL
            .iter()
            .any(|&direction| self.adjacent(cube, direction).is_none())
    }

    /// Number of occupied face neighbours.
    pub fn neighbor_count(&self, cube: &Cube) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&direction| self.adjacent(cube, direction).is_some())
            .count()
    }
}

impl PartialEq for Structure {
    fn eq(&self, other: &Self) -> bool {
        self.score() == other.score() && self.cubes == other.cubes
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structure")
            .field("cubes", &self.sorted_cubes())
            .field("score", &self.score())
            .finish()
    }
}

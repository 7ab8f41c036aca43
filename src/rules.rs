//! Placement rules.
//!
//! Each rule accepts any cube into an empty structure, so the seed cube is
//! always legal.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::cube::Cube;
use crate::direction::Direction;
use crate::policy::PlacementRule;
use crate::structure::Structure;

/// Accepts every placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PlacementRule for AcceptAll {
    fn is_valid(&self, _structure: &Structure, _cube: Cube) -> bool {
        true
    }

    fn name(&self) -> &str {
        "AcceptAll"
    }
}

/// Buildings that stand on the ground and keep every side reachable.
///
/// A cube is legal when:
/// - it is below `max_height`
/// - it rests on the ground or on another cube
/// - it touches at least one existing cube
/// - it keeps a free side face, and so does every cube it touches
#[derive(Debug, Clone, Copy)]
pub struct GroundedRule {
    pub max_height: i32,
}

impl GroundedRule {
    pub const fn new(max_height: i32) -> Self {
        Self { max_height }
    }
}

impl PlacementRule for GroundedRule {
    fn is_valid(&self, structure: &Structure, cube: Cube) -> bool {
        if structure.is_empty() {
            return true;
        }

        // cheap local checks before the trial insertion
        if cube.z >= self.max_height
            || !structure.is_supported(&cube)
            || !structure.is_connected(&cube)
            || !structure.has_free_lateral_face(&cube)
        {
            return false;
        }

        let trial = structure.add_cube(cube);
        Direction::ALL
            .iter()
            .filter_map(|&direction| trial.adjacent(&cube, direction))
            .all(|neighbor| trial.has_free_lateral_face(&neighbor))
    }

    fn name(&self) -> &str {
        "Default"
    }
}

/// Longest straight run a river may have before it has to turn.
pub const MAX_STRAIGHT_RUN: usize = 10;

/// A single unbranched path of ground-level cubes inside a square map.
///
/// A cube is legal when:
/// - it lies on the ground within `side_length / 2` of the origin on x and y
/// - after placement it touches exactly one existing cube
/// - no row or column holds more than `max_straight_run` consecutive cubes
/// - no cube in the result touches more than two others
#[derive(Debug, Clone, Copy)]
pub struct RiverRule {
    pub side_length: i32,
    pub max_straight_run: usize,
}

impl RiverRule {
    pub const fn new(side_length: i32) -> Self {
        Self {
            side_length,
            max_straight_run: MAX_STRAIGHT_RUN,
        }
    }

    /// True if any row (same y) or column (same x) has a consecutive run
    /// longer than `max_straight_run`.
    fn exceeds_straight_run(&self, structure: &Structure) -> bool {
        let mut ys_by_x: FxHashMap<i32, BTreeSet<i32>> = FxHashMap::default();
        let mut xs_by_y: FxHashMap<i32, BTreeSet<i32>> = FxHashMap::default();

        for cube in structure.cubes() {
            ys_by_x.entry(cube.x).or_default().insert(cube.y);
            xs_by_y.entry(cube.y).or_default().insert(cube.x);
        }

        ys_by_x
            .values()
            .chain(xs_by_y.values())
            .any(|line| longest_run(line) > self.max_straight_run)
    }
}

/// Length of the longest consecutive integer run in a sorted set.
fn longest_run(values: &BTreeSet<i32>) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<i32> = None;

    for &value in values {
        current = match previous {
            Some(p) if value == p + 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(value);
    }

    longest
}

impl PlacementRule for RiverRule {
    fn is_valid(&self, structure: &Structure, cube: Cube) -> bool {
        if structure.is_empty() {
            return true;
        }

        let half = self.side_length / 2;
        if cube.z != 0 || cube.x.abs() > half || cube.y.abs() > half {
            return false;
        }

        let trial = structure.add_cube(cube);
        if trial.neighbor_count(&cube) != 1 {
            return false;
        }

        if self.exceeds_straight_run(&trial) {
            return false;
        }

        // no branches anywhere
        let unbranched = trial.cubes().all(|existing| trial.neighbor_count(existing) <= 2);
        unbranched
    }

    fn name(&self) -> &str {
        "River"
    }
}

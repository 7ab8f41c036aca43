//! Objective functions for completed structures.
//!
//! `ThermalViewObjective` models a small building: faces touching other cubes
//! keep heat in, sunny faces gain heat, and open side faces with a long view
//! and few obstructed edges are worth more. `RiverObjective` rewards a river
//! that leaves plenty of the map unused in both directions.

use crate::cube::Cube;
use crate::direction::Direction;
use crate::policy::Objective;
use crate::structure::{round_score, Structure};

/// How far a side face can see before the view counts as unobstructed.
const VIEW_DISTANCE: i32 = 25;

/// Heat credit for a covered face.
const COVERED_FACE: f64 = 1.0;
const SUNNY_EAST: f64 = 0.2;
const SUNNY_WEST: f64 = 0.1;
const SUNNY_SOUTH: f64 = 0.5;

/// Sum of thermal surface quality and view quality over all cubes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThermalViewObjective;

impl Objective for ThermalViewObjective {
    fn evaluate(&self, structure: &Structure) -> f64 {
        structure
            .cubes()
            .map(|cube| thermal_quality(structure, cube) + view_quality(structure, cube))
            .sum()
    }

    fn name(&self) -> &str {
        "Default"
    }
}

/// Thermal surface quality of one cube, rounded to two decimals.
pub fn thermal_quality(structure: &Structure, cube: &Cube) -> f64 {
    let total: f64 = Direction::ALL
        .iter()
        .map(|&direction| {
            if structure.adjacent(cube, direction).is_some() {
                return COVERED_FACE;
            }
            match direction {
                Direction::East if is_sunny_east(structure, cube) => SUNNY_EAST,
                Direction::West if is_sunny_west(structure, cube) => SUNNY_WEST,
                Direction::South if is_sunny_south(structure, cube) => SUNNY_SOUTH,
                _ => 0.0,
            }
        })
        .sum();
    round_score(total)
}

/// No cube at the same height lies east of `cube` and not north of it.
fn is_sunny_east(structure: &Structure, cube: &Cube) -> bool {
    !structure.cubes().any(|other| {
        other.is_east_of(cube) && !other.is_north_of(cube) && other.same_z(cube)
    })
}

/// No cube at the same height lies west of `cube` and not north of it.
fn is_sunny_west(structure: &Structure, cube: &Cube) -> bool {
    !structure.cubes().any(|other| {
        other.is_west_of(cube) && !other.is_north_of(cube) && other.same_z(cube)
    })
}

/// No cube to the south at the same height or higher casts a shadow.
///
/// The shadow reaches five cells per level of height difference.
fn is_sunny_south(structure: &Structure, cube: &Cube) -> bool {
    !structure.cubes().any(|other| {
        other.is_south_of(cube)
            && !other.is_below(cube)
            && (other.y - cube.y).abs() < 5 * (other.z - cube.z + 1)
    })
}

/// View quality of one cube's side faces, rounded to two decimals.
pub fn view_quality(structure: &Structure, cube: &Cube) -> f64 {
    let total: f64 = Direction::LATERAL
        .iter()
        .map(|&direction| match structure.adjacent(cube, direction) {
            Some(_) => 0.0,
            None => {
                directional_factor(structure, cube, direction)
                    * edge_factor(structure, cube, direction)
            }
        })
        .sum();
    round_score(total)
}

/// Distance to the nearest cube straight ahead at the same height, scaled to `[0, 1]`.
///
/// Nothing within `VIEW_DISTANCE` counts as a full view.
fn directional_factor(structure: &Structure, cube: &Cube, direction: Direction) -> f64 {
    let (dx, dy, _) = direction.delta();
    let obstruction = (1..=VIEW_DISTANCE).find(|&step| {
        structure.contains(&Cube::new(cube.x + dx * step, cube.y + dy * step, cube.z))
    });

    match obstruction {
        None => 1.0,
        Some(distance) => round_score((distance as f64 / VIEW_DISTANCE as f64).min(1.0)),
    }
}

/// Penalty for edges of a side face that are blocked by the ground or by cubes.
fn edge_factor(structure: &Structure, cube: &Cube, face: Direction) -> f64 {
    let (dx, dy, _) = face.delta();
    let mut restricted = 0;

    // bottom edge
    if cube.z == 0 || structure.contains(&Cube::new(cube.x + dx, cube.y + dy, cube.z - 1)) {
        restricted += 1;
    }

    // left and right edges, seen from outside the face
    let sides: [(i32, i32); 2] = match face {
        Direction::North => [(-1, 1), (1, 1)],
        Direction::South => [(1, -1), (-1, -1)],
        Direction::East => [(1, 1), (1, -1)],
        Direction::West => [(-1, -1), (-1, 1)],
        Direction::Up | Direction::Down => return 1.0,
    };
    for (ox, oy) in sides {
        if structure.contains(&Cube::new(cube.x + ox, cube.y + oy, cube.z)) {
            restricted += 1;
        }
    }

    match restricted {
        1 => 0.5,
        2 => 0.25,
        3 => 0.125,
        _ => 1.0,
    }
}

/// Rewards rivers that stay close to the map centre on both axes.
///
/// Scores `max(side/2 - |x|) * max(side/2 - |y|)` over all cubes.
#[derive(Debug, Clone, Copy)]
pub struct RiverObjective {
    pub side_length: i32,
}

impl RiverObjective {
    pub const fn new(side_length: i32) -> Self {
        Self { side_length }
    }
}

impl Objective for RiverObjective {
    fn evaluate(&self, structure: &Structure) -> f64 {
        let half = self.side_length / 2;
        let max_x = structure.cubes().map(|c| half - c.x.abs()).max().unwrap_or(0);
        let max_y = structure.cubes().map(|c| half - c.y.abs()).max().unwrap_or(0);
        f64::from(max_x * max_y)
    }

    fn name(&self) -> &str {
        "River"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cube_scores() {
        let single = Structure::from_cubes([(0, 0, 0)]);
        let cube = Cube::ORIGIN;
        // east 0.2 + west 0.1 + south 0.5
        assert_eq!(thermal_quality(&single, &cube), 0.8);
        // four open faces, full view, bottom edge on the ground
        assert_eq!(view_quality(&single, &cube), 2.0);
        let total = ThermalViewObjective.evaluate(&single);
        assert!((total - 2.8).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn test_pair_on_east_west_axis() {
        let pair = Structure::from_cubes([(0, 0, 0), (1, 0, 0)]);
        // west cube: covered east face, sunny west and south
        assert_eq!(thermal_quality(&pair, &Cube::new(0, 0, 0)), 1.6);
        // east cube: covered west face, sunny east and south
        assert_eq!(thermal_quality(&pair, &Cube::new(1, 0, 0)), 1.7);
    }

    #[test]
    fn test_south_shadow_reaches_further_from_higher_cubes() {
        let cube = Cube::new(0, 0, 0);
        let near = Structure::from_cubes([(0, 0, 0), (3, -4, 0)]);
        assert!(!is_sunny_south(&near, &cube));
        let far = Structure::from_cubes([(0, 0, 0), (3, -5, 0)]);
        assert!(is_sunny_south(&far, &cube));
        let tall = Structure::from_cubes([(0, 0, 0), (3, -9, 1)]);
        assert!(!is_sunny_south(&tall, &cube));
        let low = Structure::from_cubes([(0, 0, 1), (0, -1, 0)]);
        assert!(is_sunny_south(&low, &Cube::new(0, 0, 1)));
    }

    #[test]
    fn test_directional_factor_scales_with_distance() {
        let structure = Structure::from_cubes([(0, 0, 0), (5, 0, 0), (0, 30, 0)]);
        let cube = Cube::ORIGIN;
        assert_eq!(directional_factor(&structure, &cube, Direction::East), 0.2);
        assert_eq!(directional_factor(&structure, &cube, Direction::North), 1.0);
        assert_eq!(directional_factor(&structure, &cube, Direction::West), 1.0);
    }

    #[test]
    fn test_edge_factor_counts_restrictions() {
        let cube = Cube::new(0, 0, 1);
        let open = Structure::from_cubes([(0, 0, 1)]);
        assert_eq!(edge_factor(&open, &cube, Direction::North), 1.0);

        let bottom = Structure::from_cubes([(0, 0, 1), (0, 1, 0)]);
        assert_eq!(edge_factor(&bottom, &cube, Direction::North), 0.5);

        let boxed = Structure::from_cubes([(0, 0, 1), (0, 1, 0), (-1, 1, 1), (1, 1, 1)]);
        assert_eq!(edge_factor(&boxed, &cube, Direction::North), 0.125);
    }

    #[test]
    fn test_river_objective() {
        let objective = RiverObjective::new(10);
        let river = Structure::from_cubes([(0, 0, 0), (1, 0, 0), (1, 1, 0)]);
        // half = 5; best x slack 5 (x = 0), best y slack 5 (y = 0)
        assert_eq!(objective.evaluate(&river), 25.0);
        let shifted = Structure::from_cubes([(3, 2, 0), (4, 2, 0)]);
        assert_eq!(objective.evaluate(&shifted), 6.0);
        assert_eq!(objective.evaluate(&Structure::new()), 0.0);
    }
}

//! Capability traits for placement legality and structure scoring.
//!
//! The solver only ever talks to these two traits. Concrete rule sets live in
//! `rules` and `scoring`; plain closures work too.

use crate::cube::Cube;
use crate::structure::Structure;

/// Decides whether a cube may be added to a structure.
///
/// Implementations must be pure and must accept any cube when the structure
/// is empty. The solver calls `is_valid` before committing the cube and never
/// caches the answer.
pub trait PlacementRule: Send + Sync {
    fn is_valid(&self, structure: &Structure, cube: Cube) -> bool;

    /// Short label used in report headers.
    fn name(&self) -> &str {
        "Custom"
    }
}

/// Assigns a score to a completed structure. Higher is better.
///
/// Called exactly once per completed structure, never on partial ones.
pub trait Objective: Send + Sync {
    fn evaluate(&self, structure: &Structure) -> f64;

    /// Short label used in report headers.
    fn name(&self) -> &str {
        "Custom"
    }
}

impl<F> PlacementRule for F
where
    F: Fn(&Structure, Cube) -> bool + Send + Sync,
{
    fn is_valid(&self, structure: &Structure, cube: Cube) -> bool {
        self(structure, cube)
    }
}

impl<F> Objective for F
where
    F: Fn(&Structure) -> f64 + Send + Sync,
{
    fn evaluate(&self, structure: &Structure) -> f64 {
        self(structure)
    }
}

impl PlacementRule for Box<dyn PlacementRule> {
    fn is_valid(&self, structure: &Structure, cube: Cube) -> bool {
        (**self).is_valid(structure, cube)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl Objective for Box<dyn Objective> {
    fn evaluate(&self, structure: &Structure) -> f64 {
        (**self).evaluate(structure)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

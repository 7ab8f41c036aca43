//! Cube Structure Generator Library
//!
//! Grows three-dimensional structures out of unit cubes under a pluggable
//! placement rule, scores the finished ones with a pluggable objective and
//! keeps the best distinct results of a randomized search.

pub mod archive;
pub mod cube;
pub mod direction;
pub mod error;
pub mod policy;
pub mod progress;
pub mod render;
pub mod rules;
pub mod scoring;
pub mod solver;
pub mod structure;

pub use archive::Archive;
pub use cube::Cube;
pub use direction::Direction;
pub use error::{Error, Result};
pub use policy::{Objective, PlacementRule};
pub use solver::{Evaluations, SearchConfig, SearchOutcome, Solver};
pub use structure::Structure;

/// Searches for the best structures of `config.target_cubes` cubes.
///
/// Returns the retained structures (best first, possibly none) together with
/// the number of structures evaluated.
pub fn generate<P, O>(config: SearchConfig, rule: P, objective: O) -> Result<SearchOutcome>
where
    P: PlacementRule,
    O: Objective,
{
    Solver::new(config, rule, objective)?.solve()
}

//! Randomized construction search.
//!
//! Each attempt grows one structure from the origin, cube by cube:
//! - the frontier is every free face-neighbour of the structure, listed with
//!   source cubes and directions in fresh random order
//! - the first frontier cube the placement rule accepts is committed
//! - an attempt whose frontier is entirely rejected is abandoned
//! - a structure that reaches the target size is scored once and offered to
//!   the archive
//!
//! Abandoned attempts are not retried from a branch point; the next attempt
//! starts over from the origin with new random orders. Attempts share nothing
//! but the archive and the evaluation counter, so they run on a rayon pool.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info, trace};

use crate::archive::Archive;
use crate::cube::Cube;
use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::policy::{Objective, PlacementRule};
use crate::structure::Structure;

/// Attempts run when no budget is configured.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 2_000;

/// Wall-clock budget when none is configured.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

/// Search parameters.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of cubes in every completed structure.
    pub target_cubes: usize,
    /// Number of best structures to keep.
    pub retain: usize,
    /// Upper bound on construction attempts.
    pub max_attempts: u64,
    /// Wall-clock budget, checked between attempts.
    pub time_limit: Option<Duration>,
    /// Worker threads (0 = rayon default).
    pub threads: usize,
    /// Base seed; attempt `i` uses `seed + i`. Random when unset.
    pub seed: Option<u64>,
}

impl SearchConfig {
    pub fn new(target_cubes: usize, retain: usize) -> Self {
        Self {
            target_cubes,
            retain,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            time_limit: Some(DEFAULT_TIME_LIMIT),
            threads: 0,
            seed: None,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the wall-clock budget. `None` runs until the attempts are used up.
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects parameters under which no search can run.
    pub fn validate(&self) -> Result<()> {
        if self.target_cubes == 0 {
            return Err(Error::Config("target cube count must be positive".into()));
        }
        if self.retain == 0 {
            return Err(Error::Config("number of retained structures must be positive".into()));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("attempt budget must be positive".into()));
        }
        Ok(())
    }
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Retained structures, best first. Empty if no attempt completed.
    pub structures: Vec<Structure>,
    /// Structures completed and scored during this run.
    pub evaluated: u64,
    /// Attempts started during this run.
    pub attempts: u64,
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Attempts that ended before reaching the target size.
    pub fn abandoned(&self) -> u64 {
        self.attempts.saturating_sub(self.evaluated)
    }

    pub fn best(&self) -> Option<&Structure> {
        self.structures.first()
    }

    pub fn worst(&self) -> Option<&Structure> {
        self.structures.last()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

/// Read-only view of a solver's evaluation counter.
///
/// The count only grows: one per scored structure over the solver's
/// lifetime. It may be polled from another thread while `solve` runs.
#[derive(Debug, Clone)]
pub struct Evaluations(Arc<AtomicU64>);

impl Evaluations {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why a parallel run ended early.
enum Halt {
    Stopped,
    Failed(Error),
}

/// Monte-Carlo structure builder.
pub struct Solver<P, O> {
    config: SearchConfig,
    rule: P,
    objective: O,
    evaluated: Arc<AtomicU64>,
    cancelled: Arc<AtomicBool>,
}

impl<P: PlacementRule, O: Objective> Solver<P, O> {
    /// Creates a solver, failing fast on invalid configuration.
    pub fn new(config: SearchConfig, rule: P, objective: O) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rule,
            objective,
            evaluated: Arc::new(AtomicU64::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn rule(&self) -> &P {
        &self.rule
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Returns a handle to stop the search between attempts.
    ///
    /// Once set, every later `solve` returns immediately.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Returns a read-only handle to the evaluation counter.
    pub fn evaluations(&self) -> Evaluations {
        Evaluations(Arc::clone(&self.evaluated))
    }

    /// Runs the search until the attempt or time budget is used up.
    pub fn solve(&self) -> Result<SearchOutcome> {
        let start = Instant::now();
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        let archive = Archive::new(self.config.retain);
        let attempts = AtomicU64::new(0);
        let evaluated = AtomicU64::new(0);

        debug!(
            target_cubes = self.config.target_cubes,
            retain = self.config.retain,
            max_attempts = self.config.max_attempts,
            base_seed,
            rule = self.rule.name(),
            objective = self.objective.name(),
            "starting search"
        );

        let run = || {
            (0..self.config.max_attempts)
                .into_par_iter()
                .try_for_each(|index| {
                    // stop checks only happen between attempts
                    if self.should_stop(start) {
                        return Err(Halt::Stopped);
                    }
                    attempts.fetch_add(1, Ordering::Relaxed);
                    let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(index));
                    self.run_attempt(&mut rng, index, &archive, &evaluated)
                        .map_err(Halt::Failed)
                })
        };

        let finished = if self.config.threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| Error::ThreadPool(e.to_string()))?
                .install(run)
        } else {
            run()
        };
        match finished {
            Ok(()) | Err(Halt::Stopped) => {}
            Err(Halt::Failed(e)) => return Err(e),
        }

        let outcome = SearchOutcome {
            structures: archive.into_sorted_vec(),
            evaluated: evaluated.into_inner(),
            attempts: attempts.into_inner(),
            elapsed: start.elapsed(),
        };

        if outcome.attempts < self.config.max_attempts {
            info!(
                attempts = outcome.attempts,
                cancelled = self.cancelled.load(Ordering::Relaxed),
                "search stopped before the attempt budget was used"
            );
        }
        info!(
            attempts = outcome.attempts,
            evaluated = outcome.evaluated,
            retained = outcome.structures.len(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "search finished"
        );

        Ok(outcome)
    }

    fn should_stop(&self, start: Instant) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return true;
        }
        matches!(self.config.time_limit, Some(limit) if start.elapsed() >= limit)
    }

    /// Runs one attempt and archives its result if it completes.
    ///
    /// The attempt index breaks score ties in the archive.
    fn run_attempt<G: Rng + ?Sized>(
        &self,
        rng: &mut G,
        index: u64,
        archive: &Archive,
        evaluated: &AtomicU64,
    ) -> Result<()> {
        let Some(structure) = self.attempt(rng) else {
            trace!("attempt abandoned");
            return Ok(());
        };

        let score = self.objective.evaluate(&structure);
        if !score.is_finite() {
            return Err(Error::NonFiniteScore { score });
        }

        self.evaluated.fetch_add(1, Ordering::Relaxed);
        evaluated.fetch_add(1, Ordering::Relaxed);
        archive.offer_ordered(structure.with_score(score), index);
        Ok(())
    }

    /// Grows one unscored structure to the target size.
    ///
    /// Returns `None` if some step has no frontier cube the rule accepts.
    pub fn attempt<G: Rng + ?Sized>(&self, rng: &mut G) -> Option<Structure> {
        // the seed cube is placed without consulting the rule
        let mut structure = Structure::new().add_cube(Cube::ORIGIN);

        while structure.len() < self.config.target_cubes {
            let next = frontier(&structure, rng)
                .into_iter()
                .find(|&candidate| self.rule.is_valid(&structure, candidate))?;
            structure = structure.add_cube(next);
        }

        Some(structure)
    }
}

/// Lists the free face-neighbours of a structure in random order.
///
/// Source cubes are visited in shuffled order and each draws its own
/// shuffled direction order. Each free position appears once.
pub fn frontier<G: Rng + ?Sized>(structure: &Structure, rng: &mut G) -> Vec<Cube> {
    let mut sources: Vec<Cube> = structure.cubes().copied().collect();
    sources.shuffle(rng);

    let mut listed: FxHashSet<Cube> = FxHashSet::default();
    let mut candidates = Vec::with_capacity(sources.len() * 2);

    for source in sources {
        for direction in Direction::shuffled(rng) {
            let neighbor = source.offset(direction);
            if !structure.contains(&neighbor) && listed.insert(neighbor) {
                candidates.push(neighbor);
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::thread;

    use super::*;
    use crate::rules::{AcceptAll, GroundedRule, RiverRule};
    use crate::scoring::ThermalViewObjective;

    fn config(target_cubes: usize, retain: usize) -> SearchConfig {
        SearchConfig::new(target_cubes, retain)
            .with_max_attempts(200)
            .with_time_limit(None)
            .with_seed(1234)
    }

    fn ground_count(structure: &Structure) -> f64 {
        structure.cubes().filter(|c| c.z == 0).count() as f64
    }

    /// True if every cube is reachable from the origin through face contacts.
    fn is_face_connected(structure: &Structure) -> bool {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([Cube::ORIGIN]);
        seen.insert(Cube::ORIGIN);
        while let Some(cube) = queue.pop_front() {
            for direction in Direction::ALL {
                if let Some(next) = structure.adjacent(&cube, direction) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen.len() == structure.len()
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        for bad in [
            SearchConfig::new(0, 3),
            SearchConfig::new(3, 0),
            SearchConfig::new(3, 3).with_max_attempts(0),
        ] {
            let result = Solver::new(bad, AcceptAll, ground_count);
            assert!(matches!(result, Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_single_cube_target_yields_origin() {
        let solver = Solver::new(config(1, 5), GroundedRule::new(1), |_: &Structure| 3.0).unwrap();
        let outcome = solver.solve().unwrap();

        assert_eq!(outcome.structures.len(), 1);
        let only = &outcome.structures[0];
        assert_eq!(only.sorted_cubes(), vec![Cube::ORIGIN]);
        assert_eq!(only.score(), 3.0);
        assert_eq!(outcome.evaluated, 200);
        assert_eq!(outcome.abandoned(), 0);
    }

    #[test]
    fn test_single_retained_structure_is_best_seen() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = {
            let seen = Arc::clone(&seen);
            move |structure: &Structure| {
                let score = ground_count(structure);
                seen.lock().unwrap().push(score);
                score
            }
        };

        let solver = Solver::new(config(8, 1), AcceptAll, recorder).unwrap();
        let outcome = solver.solve().unwrap();

        let seen = seen.lock().unwrap();
        let best_seen = seen.iter().copied().fold(f64::MIN, f64::max);
        assert_eq!(outcome.structures.len(), 1);
        assert_eq!(outcome.structures[0].score(), best_seen);
        assert_eq!(seen.len() as u64, outcome.evaluated);
    }

    #[test]
    fn test_rule_rejecting_growth_abandons_everything() {
        let first_only = |structure: &Structure, _: Cube| structure.is_empty();
        let solver = Solver::new(config(4, 3), first_only, ground_count).unwrap();
        let outcome = solver.solve().unwrap();

        assert!(outcome.is_empty());
        assert_eq!(outcome.evaluated, 0);
        assert_eq!(solver.evaluations().get(), 0);
        assert_eq!(outcome.attempts, 200);
        assert_eq!(outcome.abandoned(), 200);
    }

    #[test]
    fn test_accept_all_builds_connected_hexacubes() {
        let solver = Solver::new(config(6, 20), AcceptAll, ground_count).unwrap();
        let outcome = solver.solve().unwrap();

        assert!(!outcome.is_empty());
        for structure in &outcome.structures {
            assert_eq!(structure.len(), 6);
            assert!(is_face_connected(structure), "{structure:?}");
            for cube in structure.cubes() {
                let distance = cube.x.abs() + cube.y.abs() + cube.z.abs();
                assert!(distance <= 5, "{cube} is too far from the origin");
            }
        }
    }

    #[test]
    fn test_grounded_structures_are_complete_and_legal() {
        let rule = GroundedRule::new(3);
        let solver = Solver::new(config(12, 5), rule, ThermalViewObjective).unwrap();
        let outcome = solver.solve().unwrap();

        assert!(!outcome.is_empty());
        for structure in &outcome.structures {
            assert_eq!(structure.len(), 12);

            let listed: Vec<Cube> = structure.cubes().copied().collect();
            let mut deduped = listed.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(deduped.len(), listed.len());

            for cube in structure.cubes() {
                assert!(cube.z < 3);
                assert!(structure.is_supported(cube));
                assert!(structure.has_free_lateral_face(cube));
            }
        }

        let scores: Vec<f64> = outcome.structures.iter().map(Structure::score).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_river_structures_are_unbranched_paths() {
        let solver = Solver::new(config(15, 5), RiverRule::new(20), ground_count).unwrap();
        let outcome = solver.solve().unwrap();

        assert!(!outcome.is_empty());
        for structure in &outcome.structures {
            assert_eq!(structure.len(), 15);
            assert!(is_face_connected(structure));
            for cube in structure.cubes() {
                assert_eq!(cube.z, 0);
                assert!(structure.neighbor_count(cube) <= 2);
            }
        }
    }

    #[test]
    fn test_counter_is_monotonic_across_runs() {
        let solver = Solver::new(config(5, 3), AcceptAll, ground_count).unwrap();
        let counter = solver.evaluations();

        let first = solver.solve().unwrap();
        assert_eq!(counter.get(), first.evaluated);
        let second = solver.solve().unwrap();
        assert_eq!(counter.get(), first.evaluated + second.evaluated);
    }

    #[test]
    fn test_counter_never_decreases_while_solving() {
        let slow_count = |structure: &Structure| {
            thread::sleep(Duration::from_micros(200));
            ground_count(structure)
        };
        let config = config(4, 3).with_max_attempts(400).with_threads(2);
        let solver = Solver::new(config, AcceptAll, slow_count).unwrap();
        let counter = solver.evaluations();
        let done = AtomicBool::new(false);

        let (outcome, readings) = thread::scope(|scope| {
            let poller = scope.spawn(|| {
                let mut readings = Vec::new();
                while !done.load(Ordering::Relaxed) {
                    readings.push(counter.get());
                    thread::sleep(Duration::from_micros(100));
                }
                readings.push(counter.get());
                readings
            });
            let outcome = solver.solve().unwrap();
            done.store(true, Ordering::Relaxed);
            (outcome, poller.join().unwrap())
        });

        assert!(readings.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(readings.last().copied(), Some(outcome.evaluated));
        assert_eq!(outcome.evaluated, 400);
    }

    #[test]
    fn test_same_seed_keeps_same_structures() {
        let run = || {
            let config = config(5, 3).with_seed(77).with_threads(4);
            let solver = Solver::new(config, AcceptAll, ground_count).unwrap();
            let outcome = solver.solve().unwrap();
            outcome
                .structures
                .iter()
                .map(|s| (s.sorted_cubes(), s.score()))
                .collect::<Vec<_>>()
        };
        let first = run();
        assert_eq!(first.len(), 3);
        for _ in 0..10 {
            assert_eq!(run(), first);
        }
    }

    #[test]
    fn test_time_limit_stops_a_huge_budget() {
        let config = config(1, 1)
            .with_max_attempts(u64::MAX)
            .with_time_limit(Some(Duration::from_millis(50)));
        let solver = Solver::new(config, AcceptAll, ground_count).unwrap();

        let start = Instant::now();
        let outcome = solver.solve().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5), "{:?}", start.elapsed());
        assert!(outcome.attempts < u64::MAX);
        assert_eq!(outcome.structures.len(), 1);
    }

    #[test]
    fn test_cancel_stops_a_running_search() {
        let config = config(1, 1).with_max_attempts(u64::MAX);
        let solver = Solver::new(config, AcceptAll, ground_count).unwrap();
        let cancel = solver.cancel_handle();

        let start = Instant::now();
        let outcome = thread::scope(|scope| {
            scope.spawn(|| {
                thread::sleep(Duration::from_millis(30));
                cancel.store(true, Ordering::Relaxed);
            });
            solver.solve().unwrap()
        });
        assert!(start.elapsed() < Duration::from_secs(5), "{:?}", start.elapsed());
        assert!(outcome.attempts > 0);
        assert!(outcome.attempts < u64::MAX);
    }

    #[test]
    fn test_cancelled_solver_runs_no_attempts() {
        let solver = Solver::new(config(5, 3), AcceptAll, ground_count).unwrap();
        solver.cancel_handle().store(true, Ordering::Relaxed);
        let outcome = solver.solve().unwrap();
        assert_eq!(outcome.attempts, 0);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_zero_time_limit_returns_empty() {
        let config = config(5, 3).with_time_limit(Some(Duration::ZERO));
        let solver = Solver::new(config, AcceptAll, ground_count).unwrap();
        let outcome = solver.solve().unwrap();
        assert_eq!(outcome.attempts, 0);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_non_finite_score_is_an_error() {
        let solver = Solver::new(config(3, 3), AcceptAll, |_: &Structure| f64::NAN).unwrap();
        let result = solver.solve();
        assert!(matches!(result, Err(Error::NonFiniteScore { .. })));
    }

    #[test]
    fn test_explicit_thread_count() {
        let config = config(6, 3).with_threads(2);
        let solver = Solver::new(config, AcceptAll, ground_count).unwrap();
        let outcome = solver.solve().unwrap();
        assert_eq!(outcome.evaluated, 200);
        assert!(outcome.structures.len() <= 3);
    }

    #[test]
    fn test_frontier_lists_each_free_neighbor_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let structure = Structure::from_cubes([(0, 0, 0), (1, 0, 0)]);
        let candidates = frontier(&structure, &mut rng);

        // two cubes sharing a face expose 10 distinct free neighbours
        assert_eq!(candidates.len(), 10);
        let unique: FxHashSet<Cube> = candidates.iter().copied().collect();
        assert_eq!(unique.len(), candidates.len());
        for candidate in &candidates {
            assert!(!structure.contains(candidate));
            assert!(structure.is_connected(candidate));
        }
    }

    #[test]
    fn test_attempt_respects_target_size() {
        let solver = Solver::new(config(9, 1), AcceptAll, ground_count).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let structure = solver.attempt(&mut rng).unwrap();
        assert_eq!(structure.len(), 9);
        assert!(structure.contains(&Cube::ORIGIN));
        assert!(is_face_connected(&structure));
    }
}

//! Cube Structure Generator
//!
//! Grows structures of unit cubes under placement rules, scores them and
//! prints the best and worst of the retained results. Structures can be
//! inspected in an interactive 3D viewer afterwards.

mod visualization;

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stacker::rules::{GroundedRule, RiverRule};
use stacker::scoring::{RiverObjective, ThermalViewObjective};
use stacker::solver::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIME_LIMIT};
use stacker::{progress, render, Objective, PlacementRule, SearchConfig, Solver};

/// Generates cube structures and reports the best ones found.
#[derive(Parser)]
#[command(name = "stacker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Grounded buildings scored by warmth and view.
    Default {
        /// Number of cubes per structure.
        #[arg(short = 'n', long, default_value_t = 30)]
        cubes: usize,
        /// Maximum building height.
        #[arg(short = 'm', long, default_value_t = 5)]
        max_height: i32,
        /// Number of structures to keep.
        #[arg(short = 'k', long, default_value_t = 20)]
        keep: usize,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// An unbranched river on the ground of a square map.
    River {
        /// Number of cubes per structure.
        #[arg(short = 'n', long, default_value_t = 200)]
        cubes: usize,
        /// Side length of the map.
        #[arg(short = 'm', long, default_value_t = 100)]
        side: i32,
        /// Number of structures to keep.
        #[arg(short = 'k', long, default_value_t = 10)]
        keep: usize,
        #[command(flatten)]
        search: SearchArgs,
    },
}

/// Budget and scheduling flags shared by every scenario.
#[derive(Args)]
struct SearchArgs {
    /// Maximum number of construction attempts.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: u64,
    /// Wall-clock budget in milliseconds (0 = no limit).
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT.as_millis() as u64)]
    time_limit_ms: u64,
    /// Worker threads (0 = one per core).
    #[arg(long, default_value_t = 0)]
    threads: usize,
    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Open the 3D viewer after the search.
    #[arg(long)]
    view: bool,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_MAX_ATTEMPTS,
            time_limit_ms: DEFAULT_TIME_LIMIT.as_millis() as u64,
            threads: 0,
            seed: None,
            view: false,
        }
    }
}

impl SearchArgs {
    fn to_config(&self, cubes: usize, keep: usize) -> SearchConfig {
        let time_limit = (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms));
        let config = SearchConfig::new(cubes, keep)
            .with_max_attempts(self.attempts)
            .with_time_limit(time_limit)
            .with_threads(self.threads);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    // default: the grounded-building scenario with n=30, m=5, k=20
    let command = cli.command.unwrap_or(Command::Default {
        cubes: 30,
        max_height: 5,
        keep: 20,
        search: SearchArgs::default(),
    });

    let result = match command {
        Command::Default {
            cubes,
            max_height,
            keep,
            search,
        } => run_search(
            max_height,
            search.to_config(cubes, keep),
            GroundedRule::new(max_height),
            ThermalViewObjective,
            search.view,
        ),
        Command::River {
            cubes,
            side,
            keep,
            search,
        } => run_search(
            side,
            search.to_config(cubes, keep),
            RiverRule::new(side),
            RiverObjective::new(side),
            search.view,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Structure generation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one search with a live counter and prints the report.
///
/// `m` is the rule parameter, shown in the header only.
fn run_search<P, O>(
    m: i32,
    config: SearchConfig,
    rule: P,
    objective: O,
    view: bool,
) -> stacker::Result<()>
where
    P: PlacementRule,
    O: Objective,
{
    let title = format!("{} Solutions", objective.name());
    print!(
        "{}",
        render::header(&title, config.target_cubes, m, config.retain)
    );

    let solver = Solver::new(config, rule, objective)?;
    let counter = solver.evaluations();
    let (outcome, elapsed) = progress::track(
        || counter.get(),
        "Generating and evaluating structures:",
        || solver.solve(),
    );
    let outcome = outcome?;

    match (outcome.best(), outcome.worst()) {
        (Some(best), Some(worst)) => {
            println!("\nBest Solution (Score: {:.2}):", best.score());
            println!("{}", render::height_map(best));

            if worst != best {
                println!("\nWorst Solution (Score: {:.2}):", worst.score());
                println!("{}", render::height_map(worst));
            }

            println!(
                "\n{} Structures evaluated in {:.3} seconds.",
                outcome.evaluated,
                elapsed.as_secs_f64()
            );
        }
        _ => {
            println!("\nNo solutions for the given parameters found.");
            println!("Try again (the solver adds cubes in random directions)!");
        }
    }
    print!("{}", render::footer(&title));

    if view && !outcome.is_empty() {
        println!("Controls: Left/Right navigate, Up/Down spread layers, R reset");
        visualization::display(outcome.structures);
    }

    Ok(())
}

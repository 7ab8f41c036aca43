//! Error types for structure generation.

use thiserror::Error;

/// Result type alias for stacker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a search.
///
/// Running out of attempts without completing a structure is not an error;
/// the search simply returns an empty result.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid search parameters, detected before any attempt starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An objective returned NaN or an infinity.
    #[error("Objective returned a non-finite score: {score}")]
    NonFiniteScore { score: f64 },

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

//! Live progress line for long searches.
//!
//! A reporter thread polls the solver's evaluation counter and repaints a
//! single status line on stderr until the tracked task returns.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How often the status line is repainted.
const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// Runs `task` while showing `message` followed by the value `count` reads.
///
/// Returns the task's result and how long it took. The status line is
/// cleared before returning.
pub fn track<T, C, F>(count: C, message: &str, task: F) -> (T, Duration)
where
    C: Fn() -> u64 + Sync,
    F: FnOnce() -> T,
{
    let done = AtomicBool::new(false);
    let start = Instant::now();

    let result = thread::scope(|scope| {
        let reporter = scope.spawn(|| {
            let mut stderr = std::io::stderr();
            while !done.load(Ordering::Relaxed) {
                let _ = write!(stderr, "\r{message} {}", count());
                let _ = stderr.flush();
                thread::park_timeout(REFRESH_INTERVAL);
            }
            let width = message.chars().count() + 21;
            let _ = write!(stderr, "\r{}\r", " ".repeat(width));
            let _ = stderr.flush();
        });

        let result = task();
        done.store(true, Ordering::Relaxed);
        reporter.thread().unpark();
        result
    });

    (result, start.elapsed())
}

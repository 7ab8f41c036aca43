//! Bounded retention of the best structures found so far.
//!
//! The archive keeps at most `capacity` structures sorted by rounded score,
//! best first. Equal scores are ordered by an offer key: the attempt index
//! when the solver offers, the arrival order otherwise. Every call takes the
//! lock once and releases it before returning, so it can be shared across
//! worker threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::structure::Structure;

#[derive(Debug)]
struct Entry {
    structure: Structure,
    score: f64,
    order: u64,
}

impl Entry {
    /// True if this entry ranks ahead of a structure with `score` and `order`.
    fn ranks_before(&self, score: f64, order: u64) -> bool {
        self.score > score || (self.score == score && self.order < order)
    }
}

/// Thread-safe top-k collection of scored structures.
#[derive(Debug)]
pub struct Archive {
    capacity: usize,
    arrivals: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl Archive {
    /// Creates an empty archive. A capacity of zero retains nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            arrivals: AtomicU64::new(0),
            entries: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        // entries are only mutated after all checks pass
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a scored structure. Returns true if it was retained.
    ///
    /// Among equal scores the earlier arrival ranks first.
    pub fn offer(&self, structure: Structure) -> bool {
        let order = self.arrivals.fetch_add(1, Ordering::Relaxed);
        self.offer_ordered(structure, order)
    }

    /// Offers a scored structure under an explicit tie-break key.
    ///
    /// The structure is kept when the archive has room, or when it ranks
    /// ahead of the worst retained entry, which is then evicted. Equal scores
    /// rank by ascending `order`, so the outcome does not depend on the order
    /// in which offers arrive. A structure equal to one already retained only
    /// moves that entry forward if `order` is lower.
    pub fn offer_ordered(&self, structure: Structure, order: u64) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let score = structure.score();
        let mut entries = self.lock();

        if let Some(existing) = entries.iter().position(|kept| kept.structure == structure) {
            if entries[existing].order <= order {
                return false;
            }
            entries.remove(existing);
        } else if entries.len() >= self.capacity {
            match entries.last() {
                Some(worst) if !worst.ranks_before(score, order) => {}
                _ => return false,
            }
            entries.pop();
        }

        let position = entries.partition_point(|kept| kept.ranks_before(score, order));
        entries.insert(
            position,
            Entry {
                structure,
                score,
                order,
            },
        );
        debug!(score, order, rank = position, retained = entries.len(), "archived structure");
        true
    }

    /// Returns the retained structures, best first.
    pub fn snapshot(&self) -> Vec<Structure> {
        self.lock().iter().map(|entry| entry.structure.clone()).collect()
    }

    /// Consumes the archive and returns its structures, best first.
    pub fn into_sorted_vec(self) -> Vec<Structure> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .map(|entry| entry.structure)
            .collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The worst retained score, if any structure is retained.
    pub fn min_score(&self) -> Option<f64> {
        self.lock().last().map(|entry| entry.score)
    }
}

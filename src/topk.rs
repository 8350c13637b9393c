//! Top-k frequency sketching.
//!
//! [`HeavyKeeper`] estimates the k most frequent keys in an unbounded stream
//! under sub-linear memory: a matrix of fingerprinted counters, aged by
//! probabilistic exponential decay on fingerprint collision, feeds a bounded
//! min-heap of the current candidates.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::heap::MinHeap;
use crate::util::{bucket_index, hash64};

/// Decay probabilities are precomputed for cell counts up to this bound;
/// larger counts clamp to the last entry, which is effectively zero.
const DECAY_TABLE_SIZE: usize = 256;

/// A key and its estimated count, as reported by [`TopK::list`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub key: String,
    pub count: u64,
}

/// Capability surface of a top-k sketch.
///
/// [`HeavyKeeper`] is the provided implementation; alternative sketches
/// (Space-Saving, Count-Min plus a heap) can slot in behind the same three
/// operations.
pub trait TopK {
    /// Records `increment` observations of `key`.
    ///
    /// Returns the key expelled from the top-k, if admitting `key` displaced
    /// one, and whether `key` is now hot.
    fn add(&mut self, key: &str, increment: u64) -> (Option<String>, bool);

    /// Halves every tracked count, demoting stale heavy hitters.
    fn fading(&mut self);

    /// Snapshot of the current top-k, sorted by count descending.
    fn list(&self) -> Vec<Item>;
}

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    fingerprint: u64,
    count: u64,
}

/// HeavyKeeper top-k sketch.
///
/// The matrix holds `depth` rows of `width` cells, each a `(fingerprint,
/// count)` pair. An incoming key either bumps its own cells or, on
/// collision, probabilistically decays the incumbent with probability
/// `decay^count` per unit of increment, taking the cell over once it
/// empties. Keys whose estimated count reaches `min_count` compete for one
/// of `k` heap slots.
#[derive(Clone, Debug)]
pub struct HeavyKeeper {
    width: usize,
    depth: usize,
    min_count: u64,
    decay_table: Vec<f64>,
    matrix: Vec<Cell>,
    heap: MinHeap,
    rng: SmallRng,
}

impl HeavyKeeper {
    /// Creates a sketch tracking the `k` heaviest keys.
    ///
    /// `decay` must lie strictly in `(0, 1)`. Keys report as hot only once
    /// their estimated count reaches `min_count`.
    pub fn new(k: usize, width: usize, depth: usize, decay: f64, min_count: u64) -> Self {
        Self::with_seed(k, width, depth, decay, min_count, rand::random())
    }

    /// Creates a sketch with a fixed seed for the decay draws.
    ///
    /// Identical streams replayed against the same seed make identical
    /// demotion decisions, which deterministic tests rely on.
    pub fn with_seed(
        k: usize,
        width: usize,
        depth: usize,
        decay: f64,
        min_count: u64,
        seed: u64,
    ) -> Self {
        assert!(k > 0, "k must be positive");
        assert!(width > 0 && depth > 0, "matrix dimensions must be positive");
        assert!(decay.is_finite());
        assert!(decay > 0.0 && decay < 1.0, "decay must be in (0, 1)");
        let decay_table = (0..DECAY_TABLE_SIZE)
            .map(|count| decay.powi(count as i32))
            .collect();
        Self {
            width,
            depth,
            min_count,
            decay_table,
            matrix: vec![Cell::default(); width * depth],
            heap: MinHeap::new(k),
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl TopK for HeavyKeeper {
    fn add(&mut self, key: &str, increment: u64) -> (Option<String>, bool) {
        if increment == 0 {
            return (None, self.heap.count_of(key).is_some());
        }

        let hash = hash64(key.as_bytes());
        let fingerprint = hash;
        let heap_count = self.heap.count_of(key);
        let mut current_max = heap_count.unwrap_or(0);

        for row in 0..self.depth {
            let slot = row * self.width + bucket_index(hash, row as u64, self.width);
            let cell = &mut self.matrix[slot];
            if cell.count == 0 {
                cell.fingerprint = fingerprint;
                cell.count = increment;
                current_max = current_max.max(increment);
            } else if cell.fingerprint == fingerprint {
                cell.count += increment;
                current_max = current_max.max(cell.count);
            } else {
                // Collision: one decay draw per unit of increment against the
                // incumbent; take the cell over once its count empties.
                let mut units = increment;
                while units > 0 {
                    let idx = (cell.count as usize).min(DECAY_TABLE_SIZE - 1);
                    if self.rng.gen::<f64>() < self.decay_table[idx] {
                        cell.count -= 1;
                        if cell.count == 0 {
                            cell.fingerprint = fingerprint;
                            cell.count = units;
                            current_max = current_max.max(units);
                            break;
                        }
                    }
                    units -= 1;
                }
            }
        }

        if current_max < self.min_count {
            return (None, false);
        }
        if heap_count.is_some() {
            self.heap.fix(key, current_max);
            return (None, true);
        }
        if !self.heap.is_full() {
            self.heap.push(key.to_owned(), current_max);
            return (None, true);
        }
        // Ties retain the incumbent: strictly greater counts evict.
        if current_max > self.heap.min_count() {
            let expelled = self.heap.replace_min(key.to_owned(), current_max);
            return (Some(expelled), true);
        }
        (None, false)
    }

    fn fading(&mut self) {
        for cell in &mut self.matrix {
            cell.count /= 2;
        }
        self.heap.halve();
    }

    fn list(&self) -> Vec<Item> {
        self.heap.sorted_items()
    }
}

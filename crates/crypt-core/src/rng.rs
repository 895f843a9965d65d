//! Random number generation for dungeon layouts
//!
//! Uses a seeded ChaCha RNG so a seed and a configuration always reproduce
//! the same layout.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Random source threaded through every generation stage
///
/// Serializes as its seed; deserializing restarts that seed's stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct DungeonRng {
    seed: u64,
    stream: ChaCha8Rng,
}

impl From<u64> for DungeonRng {
    fn from(seed: u64) -> Self {
        Self::new(seed)
    }
}

impl From<DungeonRng> for u64 {
    fn from(rng: DungeonRng) -> Self {
        rng.seed
    }
}

impl DungeonRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            stream: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed the stream started from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in `0..n`; 0 when `n` is 0
    pub fn rn2(&mut self, n: u32) -> u32 {
        self.stream.gen_range(0..n.max(1))
    }

    /// Uniform in `lo..hi`, or `lo` when the range is empty
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            lo
        } else {
            self.stream.gen_range(lo..hi)
        }
    }

    /// True with probability `p`, clamped to `0..=1`
    pub fn chance(&mut self, p: f64) -> bool {
        match p {
            p if p <= 0.0 => false,
            p if p >= 1.0 => true,
            p => self.stream.gen_bool(p),
        }
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.stream)
    }

    /// Draw `amount` distinct indices from `0..len` without replacement
    ///
    /// `amount` is clamped to `len`. The returned order is the draw order.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(len);
        if amount == 0 {
            return Vec::new();
        }
        rand::seq::index::sample(&mut self.stream, len, amount).into_vec()
    }

    /// Pick an index with probability proportional to its weight
    ///
    /// Returns None when no weight is positive or a weight is invalid.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let dist = WeightedIndex::new(weights.iter().map(|w| w.max(0.0))).ok()?;
        Some(dist.sample(&mut self.stream))
    }
}

//! Rank-weighted sampling without replacement

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Draw weight for the entry at `rank` (0-indexed) of the remaining pool.
pub fn rank_weight(rank: usize) -> f64 {
    1.0 / (rank as f64 + 1.0)
}

/// Draws up to `count` entries from a best-first `pool`.
///
/// Each draw weights the remaining entries by their current position, so the
/// head of the ranking is favoured without being picked deterministically.
pub fn weighted_sample_without_replacement<T, R: Rng + ?Sized>(
    mut pool: Vec<T>,
    count: usize,
    rng: &mut R,
) -> Vec<T> {
    let mut picked = Vec::with_capacity(count.min(pool.len()));

    while picked.len() < count && !pool.is_empty() {
        let index = match WeightedIndex::new((0..pool.len()).map(rank_weight)) {
            Ok(distribution) => distribution.sample(rng),
            Err(_) => 0,
        };
        picked.push(pool.remove(index));
    }

    picked
}

// First-attempt selection biased away from endpoints that have been failing.
use log::trace;

use rand::Rng;

/// `floor((1 + errors) ^ 1.5)`. Every endpoint without failures scores exactly 1.
pub fn effective_error(errors: u64) -> u64 {
    // x * sqrt(x) stays exact on perfect squares, where floor() is most sensitive
    let base = errors as f64 + 1.0;
    (base * base.sqrt()).floor() as u64
}

/// Selection weights for the given error counts, or `None` when no endpoint has
/// failed yet and the choice should be uniform.
pub fn weights(counts: &[u64]) -> Option<Vec<u64>> {
    let max_effective = counts.iter().copied().map(effective_error).max()?;
    if max_effective <= 1 {
        return None;
    }

    let max_effective = max_effective as f64;
    let weights = counts
        .iter()
        .map(|&errors| (max_effective / (errors as f64 + 1.0)).ceil() as u64)
        .collect();
    Some(weights)
}

pub fn prefix_sums(weights: &[u64]) -> Vec<u64> {
    weights
        .iter()
        .scan(0u64, |total, &weight| {
            *total = total.saturating_add(weight);
            Some(*total)
        })
        .collect()
}

/// Smallest index whose running total reaches `target`.
pub fn find_ceiling(prefixes: &[u64], target: u64) -> Option<usize> {
    let index = prefixes.partition_point(|&prefix| prefix < target);
    (index < prefixes.len()).then_some(index)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedSelector;

impl WeightedSelector {
    pub fn new() -> Self {
        Self
    }

    /// Picks an index into `counts`, the error counts of the endpoints in cluster order.
    pub fn pick<R: Rng + ?Sized>(&self, counts: &[u64], rng: &mut R) -> Option<usize> {
        if counts.is_empty() {
            return None;
        }

        let Some(weights) = weights(counts) else {
            return Some(rng.gen_range(0..counts.len()));
        };

        let prefixes = prefix_sums(&weights);
        let total = prefixes.last().copied().unwrap_or(0);
        if total == 0 {
            return Some(rng.gen_range(0..counts.len()));
        }

        let target = rng.gen_range(1..=total);
        match find_ceiling(&prefixes, target) {
            Some(index) => {
                trace!("Weighted draw {target}/{total} landed on index {index}");
                Some(index)
            }
            None => Some(rng.gen_range(0..counts.len())),
        }
    }
}

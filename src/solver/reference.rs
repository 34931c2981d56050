//! Exhaustive reference solver for cross-checking small instances.

use anyhow::{Result, bail};
use rayon::prelude::*;

use super::types::Solution;
use crate::instance::{Item, Problem};

/// 2^25 masks is the largest instance worth brute-forcing.
pub const MAX_EXHAUSTIVE_ITEMS: usize = 25;

/// Scans all 2^n subsets. Ties resolve to the smallest mask, so the result
/// is deterministic regardless of the reduction order.
pub fn exhaustive_best(problem: &Problem) -> Result<Solution> {
    let n = problem.len();
    if n > MAX_EXHAUSTIVE_ITEMS {
        bail!(
            "{} items is too large for the exhaustive reference (limit {})",
            n,
            MAX_EXHAUSTIVE_ITEMS
        );
    }
    let items: Vec<Item> = (0..n).map(|i| problem.item(i)).collect();
    let capacity = problem.capacity();

    let best = (0u64..1u64 << n)
        .into_par_iter()
        .map(|mask| {
            let mut weight = 0;
            let mut value = 0;
            for (i, item) in items.iter().enumerate() {
                if mask >> i & 1 == 1 {
                    weight += item.weight;
                    value += item.value;
                }
            }
            if weight <= capacity {
                Solution { value, mask }
            } else {
                Solution { value: -1, mask }
            }
        })
        .reduce(
            || Solution { value: -1, mask: u64::MAX },
            |x, y| {
                if y.value > x.value || (y.value == x.value && y.mask < x.mask) {
                    y
                } else {
                    x
                }
            },
        );

    // the empty subset always fits a non-negative capacity
    Ok(Solution {
        value: best.value.max(0),
        mask: if best.value < 0 { 0 } else { best.mask },
    })
}

//! Orchestrator: sequences the pipeline stages, owns every buffer lifetime,
//! and reduces the per-segment candidates into the final solution.
//!
//! The pipeline is strictly linear: Partition -> Generate -> ScanMax ->
//! Prune -> SuffixScan -> Search -> Reduce. Each kernel call completes fully
//! before the next stage reads its output; there is no retry or rollback.

use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

use super::generate::{self, Scratch};
use super::kernels;
use super::mem;
use super::types::{Candidate, Order, Solution, Triple};
use crate::instance::Problem;

/// Singleton seed list for one half; halves hold at most 32 items.
type Seeds = SmallVec<[Triple; 32]>;

pub struct Solver {
    problem: Problem,
    workers: usize,
    solution: Option<Solution>,
    elapsed: Option<Duration>,
}

impl Solver {
    /// `workers` is the logical grid size W (segment count). It must be a
    /// power of two; it is clamped to the halves' enumeration sizes per run.
    pub fn new(problem: Problem, workers: usize) -> Result<Solver> {
        if workers == 0 || !workers.is_power_of_two() {
            bail!("worker count must be a power of two, got {}", workers);
        }
        Ok(Solver {
            problem,
            workers,
            solution: None,
            elapsed: None,
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Optimal selection, available after `solve()`.
    pub fn solution(&self) -> Option<Solution> {
        self.solution
    }

    /// Wall time of the last run.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Runs the full pipeline once and returns the optimal value.
    pub fn solve(&mut self) -> Result<i64> {
        let start = Instant::now();
        let capacity = self.problem.capacity();

        let (seeds_a, seeds_b) = split_items(&self.problem);
        let (ka, kb) = (seeds_a.len(), seeds_b.len());
        // every stage needs at least one record per segment
        let workers = self
            .workers
            .min(1usize << ka)
            .min(1usize << kb);

        let cap = 1usize << ka.max(kb);
        let triple = std::mem::size_of::<Triple>() as u64;
        let planned = triple * (cap as u64 * 2 + (1u64 << ka) + (1u64 << kb))
            + std::mem::size_of::<Candidate>() as u64 * (1u64 << kb);
        mem::check_estimate("pipeline buffers", planned)?;

        let progress = ProgressBar::new((ka + kb) as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} steps {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        let mut scratch = Scratch::with_capacity(cap);
        let a = generate::generate_half(&seeds_a, Order::Ascending, workers, &mut scratch, &progress);
        mem::report_rss("half A generated")?;
        let b = generate::generate_half(&seeds_b, Order::Descending, workers, &mut scratch, &progress);
        mem::report_rss("half B generated")?;
        progress.finish_and_clear();
        drop(scratch);

        // the two scans are independent; the join is their shared barrier
        let (a_maxima, b_maxima) = rayon::join(
            || kernels::segment_max(&a, workers),
            || kernels::segment_max(&b, workers),
        );

        let pruned = kernels::prune(&a, &b, &a_maxima, &b_maxima, capacity, workers);
        let table = kernels::build_running_max(&b, &pruned.b_windows, workers);
        let finals = kernels::final_search(&a, &b, &pruned.a_windows, &table, capacity, workers);

        let solution = reduce(&pruned.seeds, &finals);
        self.solution = Some(solution);
        self.elapsed = Some(start.elapsed());
        Ok(solution.value)
    }
}

/// Partitioner/Ranker: splits the items into halves A = [0, n/2) and
/// B = [n/2, n), builds singleton records carrying global-index masks, and
/// sorts A ascending / B descending by weight.
fn split_items(problem: &Problem) -> (Seeds, Seeds) {
    let n = problem.len();
    let a_count = n >> 1;

    let mut a = Seeds::new();
    for i in 0..a_count {
        let item = problem.item(i);
        a.push(Triple::singleton(i, item.weight, item.value));
    }
    let mut b = Seeds::new();
    for i in a_count..n {
        let item = problem.item(i);
        b.push(Triple::singleton(i, item.weight, item.value));
    }

    a.sort_unstable_by_key(|t| t.weight);
    b.sort_unstable_by_key(|t| std::cmp::Reverse(t.weight));
    (a, b)
}

/// Reduction across the stage-4 seed candidates (strict `>`, earliest wins)
/// and the stage-6 combined candidates (`>=`, so a combined pair overrides a
/// single-half seed on equal value).
fn reduce(seeds: &[Candidate], finals: &[Candidate]) -> Solution {
    let mut best = seeds[0];
    for c in &seeds[1..] {
        if c.value > best.value {
            best = *c;
        }
    }
    for c in finals {
        if c.value >= best.value {
            best = *c;
        }
    }
    Solution {
        value: best.value,
        mask: best.mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Item;

    fn problem(items: &[(i64, i64)], capacity: i64) -> Problem {
        let items = items
            .iter()
            .map(|&(weight, value)| Item { weight, value })
            .collect();
        Problem::new(items, capacity).unwrap()
    }

    fn solve(items: &[(i64, i64)], capacity: i64, workers: usize) -> Solution {
        let mut solver = Solver::new(problem(items, capacity), workers).unwrap();
        solver.solve().unwrap();
        solver.solution().unwrap()
    }

    #[test]
    fn picks_the_best_pair_within_capacity() {
        let s = solve(&[(2, 3), (3, 4), (4, 5), (5, 6)], 5, 2);
        assert_eq!(s.value, 7);
        assert_eq!(s.selected(), vec![0, 1]);
    }

    #[test]
    fn zero_capacity_selects_nothing() {
        let s = solve(&[(1, 1), (1, 1), (1, 1)], 0, 1);
        assert_eq!(s.value, 0);
        assert_eq!(s.mask, 0);
    }

    #[test]
    fn overweight_single_item_is_excluded() {
        let s = solve(&[(10, 100)], 5, 1);
        assert_eq!(s.value, 0);
        assert_eq!(s.mask, 0);
    }

    #[test]
    fn empty_instance_solves_to_zero() {
        let s = solve(&[], 7, 4);
        assert_eq!(s.value, 0);
        assert_eq!(s.mask, 0);
    }

    #[test]
    fn grid_wider_than_the_halves_is_clamped() {
        let s = solve(&[(2, 3), (3, 4)], 5, 64);
        assert_eq!(s.value, 7);
    }

    #[test]
    fn solving_twice_returns_the_same_value() {
        let mut solver = Solver::new(problem(&[(4, 9), (3, 7), (2, 2), (6, 11)], 9), 2).unwrap();
        let first = solver.solve().unwrap();
        let second = solver.solve().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, 18); // items 1 and 3: weight 9, value 18
    }

    #[test]
    fn rejects_non_power_of_two_grid() {
        assert!(Solver::new(problem(&[(1, 1)], 1), 3).is_err());
        assert!(Solver::new(problem(&[(1, 1)], 1), 0).is_err());
    }

    #[test]
    fn reduce_prefers_combined_pairs_on_ties() {
        let seeds = vec![Candidate { value: 5, mask: 0b01 }];
        let finals = vec![Candidate { value: 5, mask: 0b11 }];
        let s = reduce(&seeds, &finals);
        assert_eq!(s.mask, 0b11);
    }

    #[test]
    fn reduce_keeps_the_seed_when_it_is_strictly_better() {
        let seeds = vec![Candidate { value: 9, mask: 0b01 }];
        let finals = vec![Candidate { value: 5, mask: 0b11 }, Candidate::NONE];
        let s = reduce(&seeds, &finals);
        assert_eq!(s.value, 9);
        assert_eq!(s.mask, 0b01);
    }
}

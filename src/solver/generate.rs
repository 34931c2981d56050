//! Parallel Subset Generator.
//!
//! Builds the full 2^k list of subset aggregates for one half by incremental
//! doubling: at step i the current 2^i sorted records are each extended with
//! item i and the two sorted runs are merged back into one list of 2^(i+1).
//! While the list is smaller than the worker grid the add-and-merge runs on a
//! single worker; beyond that the add is one-worker-per-chunk and the merge is
//! a network of halving passes, each pass a barrier, until a single run remains.

use indicatif::ProgressBar;
use itertools::Itertools;

use super::kernels;
use super::types::{Order, Triple};

/// Ping-pong buffers for the merge network, sized once to the larger half's
/// enumeration size and reused for both halves.
pub struct Scratch {
    front: Vec<Triple>,
    back: Vec<Triple>,
}

impl Scratch {
    pub fn with_capacity(len: usize) -> Scratch {
        Scratch {
            front: vec![Triple::IDENTITY; len],
            back: vec![Triple::IDENTITY; len],
        }
    }
}

pub fn generate_half(
    seeds: &[Triple],
    order: Order,
    workers: usize,
    scratch: &mut Scratch,
    progress: &ProgressBar,
) -> Vec<Triple> {
    let mut list = Vec::with_capacity(1usize << seeds.len());
    list.push(Triple::IDENTITY);

    for &seed in seeds {
        let size = list.len();
        if size < workers {
            // below the crossover the parallel grid costs more than it saves
            let shifted: Vec<Triple> = list.iter().map(|t| t.join(seed)).collect();
            let merged: Vec<Triple> = list
                .iter()
                .copied()
                .merge_by(shifted, |a, b| order.le(a, b))
                .collect();
            list = merged;
        } else {
            let chunk = size / workers;
            kernels::scatter_shifted(&list, seed, chunk, &mut scratch.front[..2 * size]);
            // halving passes: 2W runs of `chunk` records down to a single run
            let mut run_len = chunk;
            while run_len < 2 * size {
                kernels::merge_pass(
                    order,
                    &scratch.front[..2 * size],
                    &mut scratch.back[..2 * size],
                    run_len,
                );
                std::mem::swap(&mut scratch.front, &mut scratch.back);
                run_len <<= 1;
            }
            list.clear();
            list.extend_from_slice(&scratch.front[..2 * size]);
        }
        progress.inc(1);
        progress.set_message(format!("list={}", list.len()));
    }

    list
}

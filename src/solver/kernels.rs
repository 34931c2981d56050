//! Data-parallel procedures, one typed function per kernel.
//!
//! Each call dispatches its work over the logical worker grid via rayon and
//! returns only once every worker has finished, which is the barrier between
//! pipeline stages. Callers guarantee that list lengths are powers of two and
//! that the grid size divides them.

use itertools::multiunzip;
use rayon::prelude::*;

use super::types::{Candidate, FeasibleRange, Order, RunningMaxTable, SegmentMax, Triple};

// -------------------------------------------------------------------------------------
// Generation kernels
// -------------------------------------------------------------------------------------

/// Add step of the doubling merge, one worker per chunk. Interleaves the
/// current list with its item-extended copy so each worker's output region
/// holds a (current, shifted) run pair ready for the first merge pass.
pub fn scatter_shifted(list: &[Triple], seed: Triple, chunk: usize, out: &mut [Triple]) {
    out.par_chunks_mut(2 * chunk)
        .zip(list.par_chunks(chunk))
        .for_each(|(dst, src)| {
            dst[..chunk].copy_from_slice(src);
            for (slot, rec) in dst[chunk..].iter_mut().zip(src) {
                *slot = rec.join(seed);
            }
        });
}

/// One pass of the merge network: adjacent sorted runs of `run_len` records
/// in `src` become sorted runs of `2 * run_len` in `dst`.
pub fn merge_pass(order: Order, src: &[Triple], dst: &mut [Triple], run_len: usize) {
    dst.par_chunks_mut(2 * run_len)
        .enumerate()
        .for_each(|(p, out)| {
            let off = p * 2 * run_len;
            merge_runs(
                order,
                &src[off..off + run_len],
                &src[off + run_len..off + 2 * run_len],
                out,
            );
        });
}

fn merge_runs(order: Order, left: &[Triple], right: &[Triple], out: &mut [Triple]) {
    let mut l = 0;
    let mut r = 0;
    for slot in out.iter_mut() {
        if r == right.len() || (l < left.len() && order.le(&left[l], &right[r])) {
            *slot = left[l];
            l += 1;
        } else {
            *slot = right[r];
            r += 1;
        }
    }
}

// -------------------------------------------------------------------------------------
// Scan kernels
// -------------------------------------------------------------------------------------

/// First max scan: one worker per contiguous segment, reporting the best
/// value in the segment together with its weight and mask. The final segment
/// absorbs any remainder.
pub fn segment_max(list: &[Triple], workers: usize) -> Vec<SegmentMax> {
    let seg = list.len() / workers;
    (0..workers)
        .into_par_iter()
        .map(|w| {
            let lo = w * seg;
            let hi = if w + 1 == workers { list.len() } else { lo + seg };
            let mut best = &list[lo];
            for rec in &list[lo + 1..hi] {
                if rec.value > best.value {
                    best = rec;
                }
            }
            SegmentMax {
                value: best.value,
                weight: best.weight,
                mask: best.mask,
            }
        })
        .collect()
}

// -------------------------------------------------------------------------------------
// Pruning
// -------------------------------------------------------------------------------------

pub struct PruneResult {
    /// Per A-segment: element window into B that can stay within capacity.
    pub a_windows: Vec<Option<FeasibleRange>>,
    /// Per B-segment: element window into A that can stay within capacity.
    pub b_windows: Vec<Option<FeasibleRange>>,
    /// Per worker: best single-half candidate whose weight alone fits.
    pub seeds: Vec<Candidate>,
}

/// Dominance pruner. Segment feasibility needs only the segment weight
/// extrema: A-segment minima sit at the segment's first element (ascending)
/// and increase with the segment index, B-segment minima at the last element
/// (descending) and decrease. A pair of segments admits a within-capacity
/// combination exactly when the two minima sum within the bound, so each
/// worker settles its row and column of the W x W pair grid in O(W) without
/// touching the records in between.
pub fn prune(
    a: &[Triple],
    b: &[Triple],
    a_maxima: &[SegmentMax],
    b_maxima: &[SegmentMax],
    capacity: i64,
    workers: usize,
) -> PruneResult {
    let la = a.len() / workers;
    let lb = b.len() / workers;
    let a_seg_min = |s: usize| a[s * la].weight;
    let b_seg_min = |t: usize| b[(t + 1) * lb - 1].weight;

    let rows: Vec<(Option<FeasibleRange>, Option<FeasibleRange>, Candidate)> = (0..workers)
        .into_par_iter()
        .map(|w| {
            // feasible B segments for A-segment w form a suffix
            let a_min = a_seg_min(w);
            let first_t = (0..workers).find(|&t| a_min + b_seg_min(t) <= capacity);
            let a_window = first_t.map(|t| FeasibleRange {
                lo: t * lb,
                hi: b.len(),
            });

            // feasible A segments for B-segment w form a prefix
            let b_min = b_seg_min(w);
            let last_s = (0..workers).rev().find(|&s| a_seg_min(s) + b_min <= capacity);
            let b_window = last_s.map(|s| FeasibleRange {
                lo: 0,
                hi: (s + 1) * la,
            });

            // lower bound from the maxima alone: a fitting single-half subset
            // paired with the opposite half's empty record
            let mut seed = Candidate::NONE;
            for m in [&a_maxima[w], &b_maxima[w]] {
                if m.weight <= capacity && m.value > seed.value {
                    seed = Candidate {
                        value: m.value,
                        mask: m.mask,
                    };
                }
            }

            (a_window, b_window, seed)
        })
        .collect();

    let (a_windows, b_windows, seeds) = multiunzip(rows);
    PruneResult {
        a_windows,
        b_windows,
        seeds,
    }
}

// -------------------------------------------------------------------------------------
// Second-order scan
// -------------------------------------------------------------------------------------

/// Builds the suffix running-maximum table over the B ordering: entry p holds
/// the best (value, mask) among all B records at positions >= p. Segments
/// with no surviving feasible range stay at the sentinel. Two grid passes
/// with a host-side fold of the per-segment bests in between.
pub fn build_running_max(
    b: &[Triple],
    b_windows: &[Option<FeasibleRange>],
    workers: usize,
) -> RunningMaxTable {
    let lb = b.len() / workers;
    let mut entries = vec![Candidate::NONE; b.len()];

    // pass 1: suffix maxima within each surviving segment
    entries
        .par_chunks_mut(lb)
        .enumerate()
        .for_each(|(t, seg)| {
            if b_windows[t].is_none() {
                return;
            }
            let base = t * lb;
            let mut best = Candidate::NONE;
            for r in (0..lb).rev() {
                let rec = &b[base + r];
                if rec.value > best.value {
                    best = Candidate {
                        value: rec.value,
                        mask: rec.mask,
                    };
                }
                seg[r] = best;
            }
        });

    // host fold: best over all segments after t (surviving segments form a
    // suffix, so the carry never reads an unfilled head entry it needs)
    let mut carry = vec![Candidate::NONE; workers];
    let mut best = Candidate::NONE;
    for t in (0..workers).rev() {
        carry[t] = best;
        let head = entries[t * lb];
        if head.value > best.value {
            best = head;
        }
    }

    // pass 2: fold the carry into each surviving segment
    entries
        .par_chunks_mut(lb)
        .enumerate()
        .for_each(|(t, seg)| {
            if b_windows[t].is_none() || carry[t].value < 0 {
                return;
            }
            let c = carry[t];
            for e in seg.iter_mut() {
                if c.value > e.value {
                    *e = c;
                }
            }
        });

    RunningMaxTable {
        entries,
        seg_len: lb,
    }
}

// -------------------------------------------------------------------------------------
// Final search
// -------------------------------------------------------------------------------------

/// Final cross-list search: each worker walks its A-segment in weight order
/// while the first-feasible B position advances monotonically, answering the
/// best combinable B suffix from the running-max table in O(1) per record.
pub fn final_search(
    a: &[Triple],
    b: &[Triple],
    a_windows: &[Option<FeasibleRange>],
    table: &RunningMaxTable,
    capacity: i64,
    workers: usize,
) -> Vec<Candidate> {
    let la = a.len() / workers;
    (0..workers)
        .into_par_iter()
        .map(|w| {
            let Some(win) = a_windows[w] else {
                return Candidate::NONE;
            };
            let mut best = Candidate::NONE;
            let mut j = win.lo;
            for rec in &a[w * la..(w + 1) * la] {
                let budget = capacity - rec.weight;
                if budget < 0 {
                    break; // ascending: every later record is heavier
                }
                while j < win.hi && b[j].weight > budget {
                    j += 1;
                }
                if j == win.hi {
                    break;
                }
                let top = table.at(j);
                if top.value < 0 {
                    continue;
                }
                let total = rec.value + top.value;
                if total > best.value {
                    best = Candidate {
                        value: total,
                        mask: rec.mask | top.mask,
                    };
                }
            }
            best
        })
        .collect()
}

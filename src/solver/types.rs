//! Core value types flowing through the pipeline stages.

/// Aggregate record for one subset of a half: which items (as a bitmask over
/// the global item indices), and the summed weight/value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Triple {
    pub mask: u64,
    pub weight: i64,
    pub value: i64,
}

impl Triple {
    /// The empty subset. Every generated list starts from this.
    pub const IDENTITY: Triple = Triple {
        mask: 0,
        weight: 0,
        value: 0,
    };

    #[inline]
    pub fn singleton(index: usize, weight: i64, value: i64) -> Triple {
        Triple {
            mask: 1u64 << index,
            weight,
            value,
        }
    }

    /// Aggregate of `self` plus a disjoint record (the doubling step).
    #[inline]
    pub fn join(self, other: Triple) -> Triple {
        Triple {
            mask: self.mask | other.mask,
            weight: self.weight + other.weight,
            value: self.value + other.value,
        }
    }
}

/// Sort direction of a generated list, by weight. A is ascending, B descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    /// True if `a` may precede `b` under this order. `<=`/`>=` keeps merges stable.
    #[inline]
    pub fn le(self, a: &Triple, b: &Triple) -> bool {
        match self {
            Order::Ascending => a.weight <= b.weight,
            Order::Descending => a.weight >= b.weight,
        }
    }
}

/// Per-segment scan result: the best value in the segment, the mask that
/// achieved it, and its weight (the pruner tests feasibility against it).
#[derive(Debug, Clone, Copy)]
pub struct SegmentMax {
    pub value: i64,
    pub weight: i64,
    pub mask: u64,
}

/// Half-open index window `[lo, hi)` into the opposite half's list.
/// Absence (`Option::None` at the use sites) means no feasible combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeasibleRange {
    pub lo: usize,
    pub hi: usize,
}

/// A candidate answer: value plus the selection mask that achieves it.
/// `NONE` loses against any real candidate (item values are non-negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub value: i64,
    pub mask: u64,
}

impl Candidate {
    pub const NONE: Candidate = Candidate { value: -1, mask: 0 };
}

/// Suffix running-maximum table over the B ordering: entry at position `p`
/// is the best (value, mask) among all B records at positions `>= p`.
/// Laid out per segment; unfilled (pruned) segments hold `Candidate::NONE`.
#[derive(Debug)]
pub struct RunningMaxTable {
    pub entries: Vec<Candidate>,
    pub seg_len: usize,
}

impl RunningMaxTable {
    #[inline]
    pub fn at(&self, pos: usize) -> Candidate {
        self.entries[pos]
    }
}

/// Final answer: optimal value and the selection bitmask over all n items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub value: i64,
    pub mask: u64,
}

impl Solution {
    /// Indices of the selected items, ascending.
    pub fn selected(&self) -> Vec<usize> {
        (0..64usize).filter(|i| self.mask >> i & 1 == 1).collect()
    }
}

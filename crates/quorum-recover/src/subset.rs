//! k-subset enumeration in lexicographic order
//!
//! subsets are index vectors into the caller's point slice, strictly
//! increasing, produced in lexicographic order: for n = 4, k = 2 that is
//! `[0,1] [0,2] [0,3] [1,2] [1,3] [2,3]`. the position of a subset in this
//! order is its *rank*; ranks drive both the tie-break and the parallel
//! partitioning, so [`Combinations::starting_at`] can resume from any rank
//! without walking the ones before it.

use crate::{Error, Result};

/// number of k-subsets of n items, `None` on u64 overflow
pub fn subset_count(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc == C(n, i) here, so the division is exact
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
        if acc > u64::MAX as u128 {
            return None;
        }
    }
    Some(acc as u64)
}

/// the subset at `rank` in lexicographic order, `None` if out of range
pub fn unrank(n: usize, k: usize, mut rank: u64) -> Option<Vec<usize>> {
    if rank >= subset_count(n, k)? {
        return None;
    }

    let mut subset = Vec::with_capacity(k);
    let mut next = 0;
    for slot in 0..k {
        let remaining = k - slot - 1;
        loop {
            // subsets that put `next` in this slot
            let block = subset_count(n - next - 1, remaining)?;
            if rank < block {
                break;
            }
            rank -= block;
            next += 1;
        }
        subset.push(next);
        next += 1;
    }
    Some(subset)
}

/// lazy iterator over k-subsets of `0..n`
///
/// holds only the current index vector; cloning it restarts from the same
/// position.
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// every k-subset of `0..n`, starting from `[0, 1, .., k-1]`
    pub fn new(n: usize, k: usize) -> Result<Self> {
        check_k(n, k)?;
        Ok(Self {
            n,
            indices: (0..k).collect(),
            done: false,
        })
    }

    /// resume enumeration at `rank`; an out-of-range rank yields nothing
    pub fn starting_at(n: usize, k: usize, rank: u64) -> Result<Self> {
        check_k(n, k)?;
        Ok(match unrank(n, k, rank) {
            Some(indices) => Self {
                n,
                indices,
                done: false,
            },
            None => Self {
                n,
                indices: Vec::new(),
                done: true,
            },
        })
    }

    fn advance(&mut self) {
        let k = self.indices.len();
        // rightmost slot that can still move right
        let Some(slot) = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) else {
            self.done = true;
            return;
        };
        self.indices[slot] += 1;
        for i in slot + 1..k {
            self.indices[i] = self.indices[i - 1] + 1;
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        self.advance();
        Some(current)
    }
}

/// every k-subset of `items`, as borrowed slices in lexicographic order
pub fn enumerate_subsets<T>(items: &[T], k: usize) -> Result<impl Iterator<Item = Vec<&T>> + '_> {
    let combos = Combinations::new(items.len(), k)?;
    Ok(combos.map(move |subset| subset.into_iter().map(|i| &items[i]).collect()))
}

fn check_k(n: usize, k: usize) -> Result<()> {
    if k < 1 || k > n {
        return Err(Error::InsufficientPoints { have: n, need: k });
    }
    Ok(())
}

//! robust secret recovery by majority vote
//!
//! every k-subset of the n points is interpolated on its own. a corrupted
//! share only poisons the subsets that contain it, so as long as those are
//! a minority the true constant term is the most frequent candidate.
//!
//! this is C(n, k) interpolations: fine for small n, exponential beyond.
//!
//! subsets are evaluated as a map over disjoint rank ranges (in parallel
//! when enabled), each producing a local [`Tally`]. tallies merge by summing
//! counts and keeping the lowest first-seen rank, which is independent of
//! completion order, and the winner is picked only after the full merge.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_bigint::BigInt;
use tracing::{debug, info, trace, warn};

use crate::config::RecoveryConfig;
use crate::interpolate::interpolate;
use crate::share::{decode_shares, decode_shares_lenient, DecodedShares, Point, Share};
use crate::subset::{subset_count, unrank, Combinations};
use crate::{Error, Result};

/// cooperative cancellation flag, checked before each subset
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// votes for one candidate secret
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// subsets that interpolated to this secret
    pub count: u64,
    /// lexicographic rank of the first such subset
    pub first_rank: u64,
}

/// candidate secret -> votes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    candidates: HashMap<BigInt, Candidate>,
}

impl Tally {
    fn record(&mut self, secret: BigInt, rank: u64) {
        let candidate = self.candidates.entry(secret).or_insert(Candidate {
            count: 0,
            first_rank: rank,
        });
        candidate.count += 1;
        candidate.first_rank = candidate.first_rank.min(rank);
    }

    fn merge(mut self, mut other: Self) -> Self {
        if other.candidates.len() > self.candidates.len() {
            std::mem::swap(&mut self, &mut other);
        }
        for (secret, theirs) in other.candidates {
            self.candidates
                .entry(secret)
                .and_modify(|ours| {
                    ours.count += theirs.count;
                    ours.first_rank = ours.first_rank.min(theirs.first_rank);
                })
                .or_insert(theirs);
        }
        self
    }

    pub fn get(&self, secret: &BigInt) -> Option<Candidate> {
        self.candidates.get(secret).copied()
    }

    /// votes for `secret`, 0 if it never came up
    pub fn count(&self, secret: &BigInt) -> u64 {
        self.get(secret).map_or(0, |c| c.count)
    }

    /// number of distinct candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// subsets that produced any candidate
    pub fn total(&self) -> u64 {
        self.candidates.values().map(|c| c.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BigInt, &Candidate)> {
        self.candidates.iter()
    }

    /// candidates by descending count, ties by first-seen rank
    pub fn ranked(&self) -> Vec<(&BigInt, Candidate)> {
        let mut ranked: Vec<_> = self.candidates.iter().map(|(s, c)| (s, *c)).collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then(a.first_rank.cmp(&b.first_rank))
        });
        ranked
    }

    /// the winner and whether another candidate matched its count
    fn winner(&self) -> Option<(&BigInt, Candidate, bool)> {
        let ranked = self.ranked();
        let (secret, best) = *ranked.first()?;
        let tie = ranked.get(1).is_some_and(|(_, c)| c.count == best.count);
        Some((secret, best, tie))
    }
}

/// the reconstructed secret
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecoveryResult {
    pub secret: BigInt,
    /// subsets that agreed on `secret`
    pub frequency: u64,
    /// C(n, k), including subsets that failed to interpolate
    pub total_subsets: u64,
}

impl RecoveryResult {
    /// frequency / total_subsets
    pub fn confidence(&self) -> f64 {
        if self.total_subsets == 0 {
            return 0.0;
        }
        self.frequency as f64 / self.total_subsets as f64
    }
}

/// everything a reporter needs without recomputing
#[derive(Clone, Debug)]
pub struct RecoveryReport {
    pub result: RecoveryResult,
    pub tally: Tally,
    /// subsets excluded because interpolation failed
    pub skipped: u64,
    /// the winner was picked by the first-seen rule
    pub tie: bool,
    /// x of every point off the winning polynomial, ascending
    pub suspects: Vec<i64>,
    /// shares dropped because they failed to decode
    pub rejected: Vec<(u64, Error)>,
}

#[derive(Default)]
struct Partial {
    tally: Tally,
    skipped: u64,
}

impl Partial {
    fn merge(self, other: Self) -> Self {
        Self {
            tally: self.tally.merge(other.tally),
            skipped: self.skipped + other.skipped,
        }
    }
}

/// recover the secret from decoded points with the default configuration
pub fn recover(points: &[Point], k: usize) -> Result<RecoveryReport> {
    recover_with(points, k, &RecoveryConfig::default(), &CancelToken::new())
}

/// recover the secret from decoded points
///
/// points are put in ascending (x, y) order first, so subset ranks (and with
/// them the tie-break) do not depend on the order the caller collected shares
/// in, even when two points share an x.
pub fn recover_with(
    points: &[Point],
    k: usize,
    config: &RecoveryConfig,
    cancel: &CancelToken,
) -> Result<RecoveryReport> {
    let n = points.len();
    if k < 1 || k > n {
        return Err(Error::InsufficientPoints { have: n, need: k });
    }

    let total = match (subset_count(n, k), config.max_subsets) {
        (Some(total), Some(limit)) if total > limit => {
            return Err(Error::TooManySubsets { n, k, limit })
        }
        (Some(total), _) => total,
        (None, limit) => {
            return Err(Error::TooManySubsets {
                n,
                k,
                limit: limit.unwrap_or(u64::MAX),
            })
        }
    };

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.cmp(&b.x).then_with(|| a.y.cmp(&b.y)));

    debug!(n, k, total, "evaluating subsets");
    let Partial { tally, skipped } = evaluate(&sorted, k, total, config, cancel)?;

    let Some((secret, best, tie)) = tally.winner() else {
        warn!(total, "every subset failed to interpolate");
        return Err(Error::NoValidCandidates { subsets: total });
    };
    let secret = secret.clone();
    if tie {
        warn!(
            secret = %secret,
            count = best.count,
            "tie for most frequent candidate, taking the first seen"
        );
    }

    let suspects = suspects(&sorted, k, best.first_rank)?;

    info!(
        secret = %secret,
        frequency = best.count,
        total,
        skipped,
        candidates = tally.len(),
        "recovered secret"
    );

    Ok(RecoveryReport {
        result: RecoveryResult {
            secret,
            frequency: best.count,
            total_subsets: total,
        },
        tally,
        skipped,
        tie,
        suspects,
        rejected: Vec::new(),
    })
}

/// decode raw shares and recover
///
/// undecodable shares are dropped and listed in [`RecoveryReport::rejected`].
/// with `config.strict_decoding` the first one is an error instead.
pub fn recover_shares(
    shares: &[Share],
    k: usize,
    config: &RecoveryConfig,
) -> Result<RecoveryReport> {
    let DecodedShares { points, rejected } = if config.strict_decoding {
        DecodedShares {
            points: decode_shares(shares)?,
            rejected: Vec::new(),
        }
    } else {
        decode_shares_lenient(shares)
    };

    let mut report = recover_with(&points, k, config, &CancelToken::new())?;
    report.rejected = rejected;
    Ok(report)
}

fn evaluate(
    points: &[Point],
    k: usize,
    total: u64,
    config: &RecoveryConfig,
    cancel: &CancelToken,
) -> Result<Partial> {
    if config.use_parallel(total) {
        #[cfg(feature = "parallel")]
        return evaluate_parallel(points, k, total, cancel);
    }
    evaluate_range(points, k, 0, total, cancel)
}

#[cfg(feature = "parallel")]
fn evaluate_parallel(points: &[Point], k: usize, total: u64, cancel: &CancelToken) -> Result<Partial> {
    use rayon::prelude::*;

    let chunks = (rayon::current_num_threads() as u64 * 4).clamp(1, total);
    let chunk_len = total.div_ceil(chunks);

    (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * chunk_len;
            if start >= total {
                return Ok(Partial::default());
            }
            evaluate_range(points, k, start, chunk_len.min(total - start), cancel)
        })
        .try_reduce(Partial::default, |a, b| Ok(a.merge(b)))
}

/// interpolate the `len` subsets starting at rank `start`
fn evaluate_range(
    points: &[Point],
    k: usize,
    start: u64,
    len: u64,
    cancel: &CancelToken,
) -> Result<Partial> {
    let mut partial = Partial::default();
    let combos = Combinations::starting_at(points.len(), k, start)?;

    for (rank, subset) in (start..start + len).zip(combos) {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled { rank });
        }

        let chosen: Vec<&Point> = subset.iter().map(|&i| &points[i]).collect();
        match interpolate(&chosen) {
            Ok(poly) => {
                let secret = poly.constant_term();
                trace!(rank, secret = %secret, "candidate");
                partial.tally.record(secret, rank);
            }
            Err(e) if e.is_subset_local() => {
                let xs: Vec<i64> = chosen.iter().map(|p| p.x).collect();
                debug!(rank, subset = ?xs, error = %e, "skipping subset");
                partial.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(partial)
}

/// points that do not lie on the polynomial of the subset at `rank`
fn suspects(points: &[Point], k: usize, rank: u64) -> Result<Vec<i64>> {
    let Some(subset) = unrank(points.len(), k, rank) else {
        return Ok(Vec::new());
    };
    let chosen: Vec<&Point> = subset.iter().map(|&i| &points[i]).collect();
    let poly = interpolate(&chosen)?;

    Ok(points
        .iter()
        .filter(|p| poly.evaluate(&BigInt::from(p.x)) != p.y)
        .map(|p| p.x)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: i64) -> BigInt {
        BigInt::from(v)
    }

    /// points of f(x) = coeffs[0] + coeffs[1] x + ... at x = 1..=n
    fn on_poly(coeffs: &[i64], n: i64) -> Vec<Point> {
        (1..=n)
            .map(|x| {
                let y = coeffs.iter().rev().fold(0i64, |acc, c| acc * x + c);
                Point::new(x, y)
            })
            .collect()
    }

    #[test]
    fn test_recover_consistent_shares() {
        let points = on_poly(&[1234, 5, 7], 6);
        let report = recover(&points, 3).unwrap();
        assert_eq!(report.result.secret, big(1234));
        assert_eq!(report.result.frequency, 20);
        assert_eq!(report.result.total_subsets, 20);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.tally.len(), 1);
        assert!(!report.tie);
        assert!(report.suspects.is_empty());
        assert_eq!(report.result.confidence(), 1.0);
    }

    #[test]
    fn test_recover_with_one_corrupted_share() {
        let mut points = on_poly(&[99, 3, 2], 7);
        points[4].y += 1;
        let report = recover(&points, 3).unwrap();
        assert_eq!(report.result.secret, big(99));
        // subsets avoiding share 5: C(6, 3)
        assert_eq!(report.result.frequency, 20);
        assert_eq!(report.result.total_subsets, 35);
        assert_eq!(report.suspects, vec![5]);
        assert_eq!(report.tally.total() + report.skipped, 35);
    }

    #[test]
    fn test_recover_k_equals_n() {
        let points = on_poly(&[8, 1], 2);
        let report = recover(&points, 2).unwrap();
        assert_eq!(report.result.secret, big(8));
        assert_eq!(report.result.frequency, 1);
        assert_eq!(report.result.total_subsets, 1);
    }

    #[test]
    fn test_tie_takes_first_seen() {
        // {1,2} -> 316, {1,3} skipped, {2,3} -> -10
        let points = vec![Point::new(1, 171), Point::new(2, 26), Point::new(3, 44)];
        let report = recover(&points, 2).unwrap();
        assert!(report.tie);
        assert_eq!(report.result.secret, big(316));
        assert_eq!(report.result.frequency, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.tally.get(&big(316)).unwrap().first_rank, 0);
        assert_eq!(report.tally.get(&big(-10)).unwrap().first_rank, 2);
        assert_eq!(report.suspects, vec![3]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let points = vec![Point::new(1, 171), Point::new(2, 26), Point::new(3, 44)];
        let mut shuffled = points.clone();
        shuffled.reverse();
        let a = recover(&points, 2).unwrap();
        let b = recover(&shuffled, 2).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.tally, b.tally);
    }

    #[test]
    fn test_shared_x_order_does_not_matter() {
        let a = recover(&[Point::new(1, 5), Point::new(1, 7), Point::new(2, 9)], 2).unwrap();
        let b = recover(&[Point::new(1, 7), Point::new(1, 5), Point::new(2, 9)], 2).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.tally, b.tally);
        assert!(a.tie && b.tie);
        // {(1,5),(1,7)} skipped, {(1,5),(2,9)} -> 1 ranks before {(1,7),(2,9)} -> 5
        assert_eq!(a.result.secret, big(1));
        assert_eq!(a.skipped, 1);
        assert_eq!(a.suspects, b.suspects);
    }

    #[test]
    fn test_invalid_threshold() {
        let points = on_poly(&[1, 1], 3);
        assert_eq!(
            recover(&points, 0).unwrap_err(),
            Error::InsufficientPoints { have: 3, need: 0 }
        );
        assert_eq!(
            recover(&points, 4).unwrap_err(),
            Error::InsufficientPoints { have: 3, need: 4 }
        );
    }

    #[test]
    fn test_all_subsets_fail() {
        let points = vec![Point::new(1, 1), Point::new(1, 2)];
        assert_eq!(
            recover(&points, 2).unwrap_err(),
            Error::NoValidCandidates { subsets: 1 }
        );
    }

    #[test]
    fn test_too_many_subsets() {
        let points = on_poly(&[1], 30);
        let config = RecoveryConfig::default().with_max_subsets(Some(1000));
        assert_eq!(
            recover_with(&points, 15, &config, &CancelToken::new()).unwrap_err(),
            Error::TooManySubsets { n: 30, k: 15, limit: 1000 }
        );
    }

    #[test]
    fn test_cancelled_before_first_subset() {
        let points = on_poly(&[5, 5], 4);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = recover_with(&points, 2, &RecoveryConfig::sequential(), &cancel).unwrap_err();
        assert_eq!(err, Error::Cancelled { rank: 0 });
    }

    #[test]
    fn test_cancelled_parallel() {
        let points = on_poly(&[5, 5], 6);
        let cancel = CancelToken::new();
        cancel.cancel();
        let config = RecoveryConfig::default().with_parallel_threshold(1);
        let err = recover_with(&points, 2, &config, &cancel).unwrap_err();
        // whichever chunk sees the flag first reports its rank
        match err {
            Error::Cancelled { rank } => assert!(rank < 15),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut points = on_poly(&[77, -4, 0, 1], 10);
        points[2].y += 5;
        points[7].y -= 3;

        let parallel = RecoveryConfig::default().with_parallel_threshold(1);
        let sequential = RecoveryConfig::sequential();
        let a = recover_with(&points, 4, &parallel, &CancelToken::new()).unwrap();
        let b = recover_with(&points, 4, &sequential, &CancelToken::new()).unwrap();

        assert_eq!(a.result, b.result);
        assert_eq!(a.tally, b.tally);
        assert_eq!(a.skipped, b.skipped);
        assert_eq!(a.result.secret, big(77));
        assert_eq!(a.suspects, vec![3, 8]);
    }

    #[test]
    fn test_tally_merge_is_order_independent() {
        let mut a = Tally::default();
        a.record(big(1), 4);
        a.record(big(2), 0);
        let mut b = Tally::default();
        b.record(big(1), 1);
        b.record(big(3), 2);

        let ab = a.clone().merge(b.clone());
        let ba = b.merge(a);
        assert_eq!(ab, ba);
        assert_eq!(ab.get(&big(1)), Some(Candidate { count: 2, first_rank: 1 }));
        assert_eq!(ab.total(), 4);
    }

    #[test]
    fn test_recover_shares_drops_bad_share_by_default() {
        let shares = vec![
            Share::new(1, 10, "6"),
            Share::new(2, 10, "9"),
            Share::new(3, 16, "xyz"),
            Share::new(4, 10, "15"),
        ];
        let report = recover_shares(&shares, 2, &RecoveryConfig::default()).unwrap();
        assert_eq!(report.result.secret, big(3));
        assert_eq!(report.result.total_subsets, 3);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, 3);
        assert!(matches!(report.rejected[0].1, Error::InvalidShare { index: 3, .. }));

        let strict = RecoveryConfig::default().with_strict_decoding(true);
        let err = recover_shares(&shares, 2, &strict).unwrap_err();
        assert!(matches!(err, Error::InvalidShare { index: 3, .. }));
    }

    #[test]
    fn test_recover_shares_repeated_index_goes_to_the_vote() {
        // f(x) = 2 + x, share 2 handed in twice with one bad copy
        let shares = vec![
            Share::new(1, 10, "3"),
            Share::new(2, 10, "9"),
            Share::new(2, 10, "4"),
            Share::new(3, 10, "5"),
        ];
        let report = recover_shares(&shares, 2, &RecoveryConfig::default()).unwrap();
        assert_eq!(report.result.secret, big(2));
        assert_eq!(report.result.frequency, 3);
        assert_eq!(report.skipped, 1);
        assert!(report.rejected.is_empty());

        let strict = RecoveryConfig::default().with_strict_decoding(true);
        assert_eq!(
            recover_shares(&shares, 2, &strict).unwrap_err(),
            Error::DuplicateAbscissa(2)
        );
    }
}

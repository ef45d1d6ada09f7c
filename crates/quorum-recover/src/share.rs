//! share and point types
//!
//! a [`Share`] is what a participant hands in: an index plus a value written
//! in some base. decoding turns it into a [`Point`] on the secret polynomial.

use std::collections::HashSet;

use num_bigint::BigInt;

use crate::numeral;
use crate::{Error, Result};

/// one participant's encoded piece of the secret
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Share {
    /// share index (1-indexed, the polynomial's x coordinate)
    pub index: u64,
    /// numeral base of `value`, in 2..=36
    pub base: u32,
    /// digit string in `base`
    pub value: String,
}

impl Share {
    pub fn new(index: u64, base: u32, value: impl Into<String>) -> Self {
        Self {
            index,
            base,
            value: value.into(),
        }
    }

    /// decode into a point, tagging any failure with this share's index
    pub fn decode(&self) -> Result<Point> {
        let x = i64::try_from(self.index)
            .ok()
            .filter(|&x| x > 0)
            .ok_or(Error::InvalidIndex(self.index))?;
        let y = numeral::decode(&self.value, self.base).map_err(|e| e.for_share(self.index))?;
        Ok(Point::new(x, BigInt::from(y)))
    }
}

/// a decoded (x, y) pair
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i64,
    pub y: BigInt,
}

impl Point {
    pub fn new(x: i64, y: impl Into<BigInt>) -> Self {
        Self { x, y: y.into() }
    }
}

/// outcome of lenient decoding
#[derive(Clone, Debug, Default)]
pub struct DecodedShares {
    /// successfully decoded points, in input order
    pub points: Vec<Point>,
    /// shares that were dropped, with the reason
    pub rejected: Vec<(u64, Error)>,
}

/// decode every share, failing on the first bad one
///
/// duplicate indices are rejected with [`Error::DuplicateAbscissa`] since no
/// subset containing both could ever interpolate.
pub fn decode_shares(shares: &[Share]) -> Result<Vec<Point>> {
    let mut seen = HashSet::with_capacity(shares.len());
    shares
        .iter()
        .map(|share| {
            let point = share.decode()?;
            if !seen.insert(point.x) {
                return Err(Error::DuplicateAbscissa(point.x));
            }
            Ok(point)
        })
        .collect()
}

/// decode every share, dropping the ones that fail instead of aborting
///
/// a repeated index keeps every copy. subsets holding two of them are skipped
/// by the vote, so the copy that agrees with the rest wins.
pub fn decode_shares_lenient(shares: &[Share]) -> DecodedShares {
    let mut seen = HashSet::with_capacity(shares.len());
    let mut decoded = DecodedShares::default();

    for share in shares {
        match share.decode() {
            Ok(point) => {
                if !seen.insert(point.x) {
                    tracing::warn!(index = share.index, "share index handed in more than once");
                }
                decoded.points.push(point);
            }
            Err(e) => {
                tracing::warn!(index = share.index, error = %e, "dropping undecodable share");
                decoded.rejected.push((share.index, e));
            }
        }
    }

    decoded
}

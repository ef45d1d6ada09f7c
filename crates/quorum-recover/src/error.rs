//! error types for quorum-recover

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // === decoder errors ===
    #[error("invalid digit {digit:?} at position {position} for base {base}")]
    InvalidDigit {
        digit: char,
        position: usize,
        base: u32,
    },

    #[error("base must be in 2..=36, got {0}")]
    InvalidBase(u32),

    #[error("empty numeral")]
    EmptyNumeral,

    #[error("share index must be in 1..=i64::MAX, got {0}")]
    InvalidIndex(u64),

    #[error("share {index} could not be decoded: {source}")]
    InvalidShare {
        index: u64,
        #[source]
        source: Box<Error>,
    },

    // === precondition errors ===
    #[error("insufficient points: have {have}, need {need}")]
    InsufficientPoints { have: usize, need: usize },

    #[error("duplicate abscissa: x = {0}")]
    DuplicateAbscissa(i64),

    #[error("too many subsets: C({n}, {k}) exceeds limit of {limit}")]
    TooManySubsets { n: usize, k: usize, limit: u64 },

    // === interpolation errors ===
    #[error("interpolation inconsistent: coefficient of x^{coefficient} is not an integer")]
    InterpolationInconsistent { coefficient: usize },

    // === recovery errors ===
    #[error("no valid candidates: all {subsets} subsets failed to interpolate")]
    NoValidCandidates { subsets: u64 },

    #[error("recovery cancelled before subset {rank}")]
    Cancelled { rank: u64 },
}

impl Error {
    /// attach the index of the share that failed to decode
    pub(crate) fn for_share(self, index: u64) -> Self {
        Self::InvalidShare {
            index,
            source: Box::new(self),
        }
    }

    /// true for errors that only poison a single subset and are tallied as skips
    pub fn is_subset_local(&self) -> bool {
        matches!(
            self,
            Self::DuplicateAbscissa(_) | Self::InterpolationInconsistent { .. }
        )
    }
}

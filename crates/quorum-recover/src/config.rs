//! recovery configuration

/// knobs for [`crate::recover_with`] and [`crate::recover_shares`]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecoveryConfig {
    /// evaluate subsets on the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
    /// below this many subsets, stay sequential to avoid thread overhead
    pub parallel_threshold: u64,
    /// refuse inputs with more than this many subsets; `None` disables
    pub max_subsets: Option<u64>,
    /// fail on the first undecodable or repeated share instead of dropping it
    pub strict_decoding: bool,
}

impl RecoveryConfig {
    /// default cap on C(n, k)
    pub const DEFAULT_MAX_SUBSETS: u64 = 1 << 24;

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: u64) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_max_subsets(mut self, max: Option<u64>) -> Self {
        self.max_subsets = max;
        self
    }

    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    /// sequential evaluation only
    pub fn sequential() -> Self {
        Self::default().with_parallel(false)
    }

    pub(crate) fn use_parallel(&self, subsets: u64) -> bool {
        cfg!(feature = "parallel") && self.parallel && subsets >= self.parallel_threshold
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 64,
            max_subsets: Some(Self::DEFAULT_MAX_SUBSETS),
            strict_decoding: false,
        }
    }
}

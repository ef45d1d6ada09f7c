//! # quorum-recover
//!
//! robust threshold secret reconstruction.
//!
//! given n shares of a secret split with a degree-(k-1) polynomial, recover
//! the secret even when some shares are corrupted: interpolate every k-subset
//! exactly over the integers and take the constant term most subsets agree on.
//!
//! ## pipeline
//!
//! ```text
//! shares (index, base, digits)
//!     │ numeral::decode
//!     ▼
//! points (x, y)
//!     │ subset::Combinations       C(n, k) subsets, lexicographic
//!     ▼
//! interpolate::interpolate         exact, one division per coefficient
//!     │ constant term
//!     ▼
//! recover::Tally                   majority vote, first-seen tie-break
//!     │
//!     ▼
//! RecoveryReport { result, tally, skipped, tie, suspects, rejected }
//! ```
//!
//! ## usage
//!
//! ```rust
//! use quorum_recover::{recover_shares, BigInt, RecoveryConfig, Share};
//!
//! // f(x) = 3 + 3x
//! let shares = vec![
//!     Share::new(1, 10, "6"),
//!     Share::new(2, 2, "1001"),
//!     Share::new(3, 16, "c"),
//! ];
//! let report = recover_shares(&shares, 2, &RecoveryConfig::default())?;
//! assert_eq!(report.result.secret, BigInt::from(3));
//! assert_eq!(report.result.frequency, 3);
//! # Ok::<(), quorum_recover::Error>(())
//! ```
//!
//! a share that fails to decode does not stop the run: it is dropped and
//! listed in [`RecoveryReport::rejected`]. set
//! [`RecoveryConfig::strict_decoding`] to fail on it instead.
//!
//! ## scaling
//!
//! the vote costs C(n, k) interpolations. [`RecoveryConfig::max_subsets`]
//! bounds it and [`CancelToken`] stops a run between subsets.

pub mod config;
pub mod error;
pub mod interpolate;
pub mod numeral;
pub mod recover;
pub mod share;
pub mod subset;

pub use config::RecoveryConfig;
pub use error::{Error, Result};
pub use interpolate::{interpolate, interpolate_scaled, Polynomial, ScaledPolynomial};
pub use numeral::{decode, encode};
pub use recover::{
    recover, recover_shares, recover_with, CancelToken, Candidate, RecoveryReport,
    RecoveryResult, Tally,
};
pub use share::{decode_shares, decode_shares_lenient, DecodedShares, Point, Share};
pub use subset::{enumerate_subsets, subset_count, unrank, Combinations};

pub use num_bigint::{BigInt, BigUint};

//! share case files
//!
//! a case is a JSON object with a `keys` entry and one entry per share:
//!
//! ```json
//! {
//!     "keys": { "n": 4, "k": 3 },
//!     "1": { "base": "10", "value": "4" },
//!     "2": { "base": "2", "value": "111" }
//! }
//! ```
//!
//! `base` may be a string or a number.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quorum_recover::Share;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct Keys {
    n: usize,
    k: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Base {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawShare {
    base: Base,
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawCase {
    keys: Keys,
    #[serde(flatten)]
    shares: BTreeMap<String, RawShare>,
}

/// a parsed case, shares ordered by index
#[derive(Debug, Clone)]
pub struct Case {
    pub k: usize,
    pub shares: Vec<Share>,
}

impl Case {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid case file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawCase = serde_json::from_str(text).context("malformed case json")?;

        let mut shares = raw
            .shares
            .into_iter()
            .map(|(key, share)| {
                let index: u64 = key
                    .trim()
                    .parse()
                    .with_context(|| format!("share key {:?} is not an index", key))?;
                let base = match share.base {
                    Base::Number(b) => b,
                    Base::Text(s) => s
                        .trim()
                        .parse()
                        .with_context(|| format!("share {}: base {:?} is not a number", index, s))?,
                };
                Ok(Share::new(index, base, share.value.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        shares.sort_by_key(|s| s.index);

        if raw.keys.n != shares.len() {
            warn!(
                declared = raw.keys.n,
                found = shares.len(),
                "share count does not match keys.n, using the shares found"
            );
        }
        if raw.keys.k == 0 || raw.keys.k > shares.len() {
            bail!(
                "threshold k = {} needs between 1 and {} shares",
                raw.keys.k,
                shares.len()
            );
        }

        Ok(Self {
            k: raw.keys.k,
            shares,
        })
    }

    /// shares actually present in the file
    pub fn n(&self) -> usize {
        self.shares.len()
    }
}

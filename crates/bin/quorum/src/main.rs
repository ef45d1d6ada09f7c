//! quorum CLI
//!
//! Recovers threshold secrets from share case files, voting across every
//! k-subset so a minority of corrupted shares cannot change the answer.
//!
//! ## Usage
//!
//! ```bash
//! # Recover one or more cases
//! quorum recover case1.json case2.json
//!
//! # Machine-readable output, fail a case on any undecodable share
//! quorum recover --json --strict cases/*.json
//!
//! # Numeral helpers
//! quorum decode --base 16 2c
//! quorum encode --base 36 123456789
//! ```

mod case;
mod summary;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use quorum_recover::{decode, encode, recover_shares, RecoveryConfig};
use tracing::{error, info};

use case::Case;
use summary::{CaseSummary, Outcome};

#[derive(Parser)]
#[command(name = "quorum")]
#[command(about = "Robust threshold secret recovery by exact interpolation and majority vote")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover the secret of each case file
    Recover {
        /// Case files (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Recovery config (TOML)
        #[arg(short, long, env = "QUORUM_CONFIG")]
        config: Option<PathBuf>,

        /// Override the threshold from the case files
        #[arg(short)]
        k: Option<usize>,

        /// Evaluate subsets on a single thread
        #[arg(long)]
        sequential: bool,

        /// Refuse cases with more than this many subsets
        #[arg(long)]
        max_subsets: Option<u64>,

        /// Fail the case on an undecodable or repeated share instead of dropping it
        #[arg(long)]
        strict: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Decode a numeral to decimal
    Decode {
        /// Numeral base (2-36)
        #[arg(short, long)]
        base: u32,

        /// Digits
        digits: String,
    },

    /// Encode a decimal number in another base
    Encode {
        /// Numeral base (2-36)
        #[arg(short, long)]
        base: u32,

        /// Decimal value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("quorum={},quorum_recover={}", level, level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Recover {
            files,
            config,
            k,
            sequential,
            max_subsets,
            strict,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if sequential {
                config = config.with_parallel(false);
            }
            if let Some(max) = max_subsets {
                config = config.with_max_subsets(Some(max));
            }
            if strict {
                config = config.with_strict_decoding(true);
            }
            run_recover(&files, k, &config, json)
        }
        Commands::Decode { base, digits } => {
            let value = decode(&digits, base)?;
            println!("{}", value);
            Ok(())
        }
        Commands::Encode { base, value } => {
            let value = decode(&value, 10).context("value must be a non-negative decimal")?;
            println!("{}", encode(&value, base)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RecoveryConfig> {
    let Some(path) = path else {
        return Ok(RecoveryConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: RecoveryConfig = toml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

fn run_recover(files: &[PathBuf], k: Option<usize>, config: &RecoveryConfig, json: bool) -> Result<()> {
    let summaries: Vec<CaseSummary> = files
        .iter()
        .map(|path| run_case(path, k, config))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            println!("{}", summary);
        }
    }

    let failed = summaries.iter().filter(|s| s.outcome.is_failure()).count();
    if failed > 0 {
        bail!("{} of {} cases failed", failed, summaries.len());
    }
    Ok(())
}

fn run_case(path: &Path, k: Option<usize>, config: &RecoveryConfig) -> CaseSummary {
    let file = path.display().to_string();
    let case = match Case::load(path) {
        Ok(case) => case,
        Err(e) => {
            error!(file = %file, "{:#}", e);
            return CaseSummary {
                file,
                n: 0,
                k: 0,
                outcome: Outcome::failed(&e),
            };
        }
    };

    let k = k.unwrap_or(case.k);
    info!(file = %file, n = case.n(), k, "recovering");
    let outcome = match recover_shares(&case.shares, k, config) {
        Ok(report) => Outcome::from_report(&report),
        Err(e) => {
            let e = anyhow::Error::from(e).context(format!("recovery failed for {}", file));
            error!("{:#}", e);
            Outcome::failed(&e)
        }
    };

    CaseSummary {
        file,
        n: case.n(),
        k,
        outcome,
    }
}

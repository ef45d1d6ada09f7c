//! per-case output

use std::fmt;

use quorum_recover::RecoveryReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CaseSummary {
    pub file: String,
    pub n: usize,
    pub k: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Recovered {
        /// decimal, values do not fit json numbers
        secret: String,
        frequency: u64,
        total_subsets: u64,
        confidence: f64,
        skipped: u64,
        candidates: usize,
        tie: bool,
        suspects: Vec<i64>,
        rejected: Vec<u64>,
    },
    Failed {
        error: String,
    },
}

impl Outcome {
    pub fn from_report(report: &RecoveryReport) -> Self {
        Self::Recovered {
            secret: report.result.secret.to_string(),
            frequency: report.result.frequency,
            total_subsets: report.result.total_subsets,
            confidence: report.result.confidence(),
            skipped: report.skipped,
            candidates: report.tally.len(),
            tie: report.tie,
            suspects: report.suspects.clone(),
            rejected: report.rejected.iter().map(|(index, _)| *index).collect(),
        }
    }

    pub fn failed(err: &anyhow::Error) -> Self {
        Self::Failed {
            error: format!("{:#}", err),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

fn join(values: &[impl ToString]) -> String {
    if values.is_empty() {
        return "none".into();
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for CaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.file)?;
        writeln!(f, "  shares:     n={} k={}", self.n, self.k)?;
        match &self.outcome {
            Outcome::Recovered {
                secret,
                frequency,
                total_subsets,
                confidence,
                skipped,
                candidates,
                tie,
                suspects,
                rejected,
            } => {
                writeln!(f, "  secret:     {}", secret)?;
                writeln!(
                    f,
                    "  agreement:  {}/{} subsets ({:.2}%)",
                    frequency,
                    total_subsets,
                    confidence * 100.0
                )?;
                writeln!(f, "  candidates: {} ({} subsets skipped)", candidates, skipped)?;
                if *tie {
                    writeln!(f, "  tie:        broken by first subset seen")?;
                }
                writeln!(f, "  suspects:   {}", join(suspects.as_slice()))?;
                if !rejected.is_empty() {
                    writeln!(f, "  rejected:   {}", join(rejected.as_slice()))?;
                }
            }
            Outcome::Failed { error } => {
                writeln!(f, "  error:      {}", error)?;
            }
        }
        Ok(())
    }
}

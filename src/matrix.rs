//! the fixed set of trials of a full run

use std::io::Write;

use crate::candidate::Candidate;
use crate::error::Abort;
use crate::report::TrialReport;
use crate::runner::{Runner, Trial};

/// Record counts every candidate is loaded with.
pub const RECORD_COUNTS: [u64; 4] = [1_000, 1_000_000, 10_000_000, 100_000_000];

/// Random lookups per trial.
pub const LOOKUPS: u64 = 1_000_000;

/// The scales a candidate is run at, smallest first.
pub fn trials() -> Vec<Trial> {
    RECORD_COUNTS
        .iter()
        .map(|&records| Trial::new(records, LOOKUPS))
        .collect()
}

/// Run every candidate at every scale, one trial at a time, stopping at the
/// first failure.
pub fn run_all<W: Write>(
    runner: &mut Runner<W>,
    candidates: &[Box<dyn Candidate>],
    trials: &[Trial],
) -> Result<Vec<TrialReport>, Abort> {
    let mut reports = Vec::with_capacity(candidates.len() * trials.len());
    for candidate in candidates {
        for trial in trials {
            reports.push(runner.run(candidate.as_ref(), *trial)?);
        }
    }
    log::info!("[Matrix] {} trials completed", reports.len());
    Ok(reports)
}

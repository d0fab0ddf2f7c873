//! drive one candidate through one trial
//!
//! A trial walks `Reset -> Populating -> Populated -> LookingUp -> Done`.
//! Any error moves it to `Failed` and aborts the run; the artifact set is
//! removed on the way out either way.

use std::io::Write;

use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::artifacts;
use crate::candidate::Candidate;
use crate::clock::{self, Snapshot};
use crate::config::HarnessConfig;
use crate::error::{Abort, BenchError};
use crate::record::MAX_RECORDS;
use crate::report::{self, TrialReport};

/// One (record count, lookup count) scale to run a candidate at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trial {
    /// records loaded during populate
    pub records: u64,
    /// random lookups during verify
    pub lookups: u64,
}

impl Trial {
    /// `records` records and `lookups` lookups.
    pub fn new(records: u64, lookups: u64) -> Self {
        Trial { records, lookups }
    }

    fn validate(&self) -> Result<(), BenchError> {
        if self.records == 0 || self.lookups == 0 {
            return Err(BenchError::InvalidTrial {
                reason: format!(
                    "need at least one record and one lookup, got {} and {}",
                    self.records, self.lookups
                ),
            });
        }
        if self.records > MAX_RECORDS {
            return Err(BenchError::InvalidTrial {
                reason: format!("{} records exceeds the maximum of {}", self.records, MAX_RECORDS),
            });
        }
        Ok(())
    }
}

/// Where a trial is in its lifecycle.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Reset,
    Populating,
    Populated,
    LookingUp,
    Done,
    Failed,
}

/// Runs trials one after the other, printing the report to `out`.
pub struct Runner<W: Write> {
    out: W,
    rng: SmallRng,
}

impl<W: Write> Runner<W> {
    /// A runner seeded from `config`.
    pub fn new(config: &HarnessConfig, out: W) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Runner { out, rng }
    }

    /// Give back the report writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Run `trial` against `candidate`, removing its artifacts before and
    /// after.
    pub fn run(&mut self, candidate: &dyn Candidate, trial: Trial) -> Result<TrialReport, Abort> {
        let result = self.run_phases(candidate, trial);
        let cleanup = artifacts::remove_all(&candidate.artifacts());
        match (result, cleanup) {
            (Ok(report), Ok(())) => {
                log::debug!("[Runner] {} n={} {:?}", candidate.name(), trial.records, Phase::Done);
                Ok(report)
            }
            (Ok(_), Err(e)) => Err(Abort::new(Phase::Done, e)),
            (Err(abort), cleanup) => {
                if let Err(e) = cleanup {
                    log::warn!("[Runner] cleanup after failure also failed, {:#}", e);
                }
                log::error!(
                    "[Runner] {} n={} {:?} while {:?}",
                    candidate.name(),
                    trial.records,
                    Phase::Failed,
                    abort.phase()
                );
                Err(abort)
            }
        }
    }

    fn run_phases(&mut self, candidate: &dyn Candidate, trial: Trial) -> Result<TrialReport, Abort> {
        let name = candidate.name();
        let n = trial.records;
        let paths = candidate.artifacts();
        trial
            .validate()
            .map_err(|e| Abort::new(Phase::Reset, e.into()))?;

        report::header(&mut self.out, name, &trial).map_err(|e| Abort::new(Phase::Reset, e.into()))?;
        log::info!("[Runner] {} n={} lookups={}", name, n, trial.lookups);

        artifacts::remove_all(&paths).map_err(|e| Abort::new(Phase::Reset, e))?;

        log::debug!("[Runner] {} n={} {:?}", name, n, Phase::Populating);
        let t1 = Snapshot::take().map_err(|e| Abort::new(Phase::Populating, e))?;
        let data_size = candidate
            .populate(n)
            .with_context(|| format!("{} failed to populate {} records", name, n))
            .map_err(|e| Abort::new(Phase::Populating, e))?;
        let t2 = Snapshot::take().map_err(|e| Abort::new(Phase::Populating, e))?;

        log::debug!("[Runner] {} n={} {:?}", name, n, Phase::Populated);
        let creation = t2.since(&t1);
        let puts = clock::throughput(n, &creation);
        artifacts::ensure_present(&paths).map_err(|e| Abort::new(Phase::Populated, e))?;
        let file_size = artifacts::total_size(&paths).map_err(|e| Abort::new(Phase::Populated, e))?;
        report::creation(&mut self.out, &creation, &puts, data_size, file_size)
            .map_err(|e| Abort::new(Phase::Populated, e.into()))?;

        log::debug!("[Runner] {} n={} {:?}", name, n, Phase::LookingUp);
        // the report above is excluded from the lookup interval
        let t2 = Snapshot::take().map_err(|e| Abort::new(Phase::LookingUp, e))?;
        candidate
            .verify(n, trial.lookups, &mut self.rng)
            .with_context(|| format!("{} failed verification of {} records", name, n))
            .map_err(|e| Abort::new(Phase::LookingUp, e))?;
        let t3 = Snapshot::take().map_err(|e| Abort::new(Phase::LookingUp, e))?;

        let lookup = t3.since(&t2);
        let lookups = clock::throughput(trial.lookups, &lookup);
        report::lookup(&mut self.out, &lookup, &lookups).map_err(|e| Abort::new(Phase::Done, e.into()))?;

        Ok(TrialReport {
            candidate: name.to_owned(),
            trial,
            creation,
            puts,
            data_size,
            file_size,
            lookup,
            lookups,
        })
    }
}

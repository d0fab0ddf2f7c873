//! the interface every benchmarked backend implements

use std::path::PathBuf;

use rand::{Rng, RngCore};

use crate::error::BenchError;
use crate::record::{KeyKind, RecordBuf};
use crate::Result;

/// A storage backend under benchmark.
///
/// A candidate holds no state between calls apart from what its engine
/// persists into [`Candidate::artifacts`].
pub trait Candidate {
    /// The name printed in the report.
    fn name(&self) -> &str;

    /// Bulk load records `0..n` in key order, committing in batches.
    ///
    /// Returns the engine's own measure of the data size.
    fn populate(&self, n: u64) -> Result<u64>;

    /// Look up `lookups` uniformly random records out of `0..n` and compare
    /// them against the expected values. The first bad record fails the call.
    fn verify(&self, n: u64, lookups: u64, rng: &mut dyn RngCore) -> Result<()>;

    /// Every path the engine creates, in a fixed order.
    fn artifacts(&self) -> Vec<PathBuf>;
}

/// Outcome of one point lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// stored value equals the expected one
    Match,
    /// key found, value differs in length or content
    Mismatch,
    /// key not found
    Missing,
}

impl Probe {
    /// Compare a lookup result against the expected value.
    pub fn check(found: Option<&[u8]>, expected: &[u8]) -> Self {
        match found {
            Some(v) if v == expected => Probe::Match,
            Some(_) => Probe::Mismatch,
            None => Probe::Missing,
        }
    }
}

/// The random access loop shared by all candidates.
///
/// `probe` receives the key and the expected value of a sampled record and
/// reports what the engine holds for it.
pub fn verify_lookups<F>(
    n: u64,
    lookups: u64,
    rng: &mut dyn RngCore,
    kind: KeyKind,
    mut probe: F,
) -> Result<()>
where
    F: FnMut(&[u8], &[u8]) -> Result<Probe>,
{
    let mut record = RecordBuf::new(kind);
    for _ in 0..lookups {
        let index = rng.gen_range(0..n);
        let (key, value) = record.format(index);
        match probe(key, value)? {
            Probe::Match => {}
            Probe::Mismatch => Err(BenchError::Mismatch {
                key: kind.describe(index),
            })?,
            Probe::Missing => Err(BenchError::Missing {
                key: kind.describe(index),
            })?,
        }
    }
    Ok(())
}

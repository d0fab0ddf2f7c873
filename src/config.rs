//! harness configuration

use std::path::PathBuf;

/// Number of records committed per write transaction.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Settings shared by every trial of a run.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Directory the candidates create their artifacts in.
    pub workdir: PathBuf,
    /// Records per committed batch during populate.
    pub batch_size: usize,
    /// Seed for the lookup index generator, `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl HarnessConfig {
    /// Config rooted at `workdir` with default batching and a random seed.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        HarnessConfig {
            workdir: workdir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }

    /// Use a fixed seed for the lookup phase.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the number of records per batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig::new(".")
    }
}

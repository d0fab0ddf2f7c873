//! wrap sled as a benchmark candidate
use std::path::PathBuf;

use rand::RngCore;
use sled::{Batch, Db};

use crate::candidate::{verify_lookups, Candidate, Probe};
use crate::config::HarnessConfig;
use crate::record::{KeyKind, RecordBuf};
use crate::Result;

const DB_DIR: &str = "test.sled";

/// sled keeps its tree, config and snapshots in one directory
pub struct SledCandidate {
    name: String,
    path: PathBuf,
    batch_size: usize,
    compression: Option<i32>,
}

impl SledCandidate {
    /// zstd level of the compressed configuration
    pub const COMPRESSION_FACTOR: i32 = 3;

    /// The uncompressed candidate storing its directory under `config.workdir`.
    pub fn new(config: &HarnessConfig) -> Self {
        SledCandidate {
            name: "sled uncompressed".to_owned(),
            path: config.workdir.join(DB_DIR),
            batch_size: config.batch_size,
            compression: None,
        }
    }

    /// Same layout, pages compressed with zstd.
    pub fn compressed(config: &HarnessConfig) -> Self {
        SledCandidate {
            name: format!("sled compressed({})", Self::COMPRESSION_FACTOR),
            compression: Some(Self::COMPRESSION_FACTOR),
            ..SledCandidate::new(config)
        }
    }

    fn open(&self) -> Result<Db> {
        let mut config = sled::Config::new()
            .path(&self.path)
            .mode(sled::Mode::HighThroughput);
        if let Some(factor) = self.compression {
            config = config.use_compression(true).compression_factor(factor);
        }
        Ok(config.open()?)
    }
}

impl Candidate for SledCandidate {
    fn name(&self) -> &str {
        &self.name
    }

    fn populate(&self, n: u64) -> Result<u64> {
        let db = self.open()?;
        let mut record = RecordBuf::new(KeyKind::Text);
        let mut batch = Batch::default();
        let mut pending = 0;
        for i in 0..n {
            let (key, value) = record.format(i);
            batch.insert(key, value);
            pending += 1;
            if pending == self.batch_size {
                db.apply_batch(std::mem::take(&mut batch))?;
                pending = 0;
            }
        }
        if pending > 0 {
            db.apply_batch(batch)?;
        }
        db.flush()?;
        let size = db.size_on_disk()?;
        log::debug!("[sled] {} records, {} bytes on disk", db.len(), size);
        Ok(size)
    }

    fn verify(&self, n: u64, lookups: u64, rng: &mut dyn RngCore) -> Result<()> {
        let db = self.open()?;
        verify_lookups(n, lookups, rng, KeyKind::Text, |key, expected| {
            let found = db.get(key)?;
            Ok(Probe::check(found.as_deref(), expected))
        })
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        vec![self.path.clone()]
    }
}

//! wrap redb as a benchmark candidate

use std::path::PathBuf;

use rand::RngCore;
use redb::{Database, Durability, TableDefinition};

use crate::artifacts;
use crate::candidate::{verify_lookups, Candidate, Probe};
use crate::config::HarnessConfig;
use crate::record::{KeyKind, RecordBuf};
use crate::Result;

const DB_FILE: &str = "test.redb";
const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("records");

/// redb in a single file.
///
/// Intermediate batches commit with [`Durability::None`]; the last one is
/// durable, which makes every earlier batch visible on reopen.
pub struct RedbCandidate {
    path: PathBuf,
    batch_size: usize,
}

impl RedbCandidate {
    /// The candidate storing its file under `config.workdir`.
    pub fn new(config: &HarnessConfig) -> Self {
        RedbCandidate {
            path: config.workdir.join(DB_FILE),
            batch_size: config.batch_size,
        }
    }
}

impl Candidate for RedbCandidate {
    fn name(&self) -> &str {
        "redb"
    }

    fn populate(&self, n: u64) -> Result<u64> {
        let db = Database::create(&self.path)?;
        let mut record = RecordBuf::new(KeyKind::Text);
        let mut start = 0;
        while start < n {
            let end = n.min(start + self.batch_size as u64);
            let mut txn = db.begin_write()?;
            if end < n {
                txn.set_durability(Durability::None);
            } else {
                txn.set_durability(Durability::Immediate);
            }
            {
                let mut table = txn.open_table(TABLE)?;
                for i in start..end {
                    let (key, value) = record.format(i);
                    table.insert(key, value)?;
                }
            }
            txn.commit()?;
            start = end;
        }
        drop(db);
        artifacts::total_size(&self.artifacts())
    }

    fn verify(&self, n: u64, lookups: u64, rng: &mut dyn RngCore) -> Result<()> {
        let db = Database::open(&self.path)?;
        let txn = db.begin_read()?;
        let table = txn.open_table(TABLE)?;
        verify_lookups(n, lookups, rng, KeyKind::Text, |key, expected| {
            let found = table.get(key)?;
            Ok(Probe::check(found.as_ref().map(|guard| guard.value()), expected))
        })
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        vec![self.path.clone()]
    }
}

//! wrap LMDB (through heed) as a benchmark candidate

use std::path::PathBuf;

use heed::types::Bytes;
use heed::{Database, DatabaseFlags, Env, EnvFlags, EnvOpenOptions, PutFlags};
use rand::RngCore;

use crate::candidate::{verify_lookups, Candidate, Probe};
use crate::config::HarnessConfig;
use crate::record::{KeyKind, RecordBuf};
use crate::Result;

const DATA_FILE: &str = "test.mdb";
const LOCK_FILE: &str = "test.mdb-lock";

/// LMDB in a single data file, opened without sync for raw write speed.
pub struct LmdbCandidate {
    name: String,
    path: PathBuf,
    lock_path: PathBuf,
    keys: KeyKind,
    batch_size: usize,
}

impl LmdbCandidate {
    pub(crate) const MIN_MAP_SIZE: usize = 1 << 20;
    // roughly two 64 byte entries per record
    pub(crate) const BYTES_PER_RECORD: usize = 128;
    const MAP_ALIGN: usize = 64 << 10;

    /// The candidate storing its files under `config.workdir`.
    pub fn new(config: &HarnessConfig, keys: KeyKind) -> Self {
        let name = match keys {
            KeyKind::Text => "LMDB",
            KeyKind::Integer => "LMDB integer keys",
        };
        LmdbCandidate {
            name: name.to_owned(),
            path: config.workdir.join(DATA_FILE),
            lock_path: config.workdir.join(LOCK_FILE),
            keys,
            batch_size: config.batch_size,
        }
    }

    /// Path of the data file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn map_size(n: u64) -> usize {
        let wanted = (n as usize)
            .saturating_mul(Self::BYTES_PER_RECORD)
            .max(Self::MIN_MAP_SIZE);
        (wanted + Self::MAP_ALIGN - 1) / Self::MAP_ALIGN * Self::MAP_ALIGN
    }

    fn db_flags(&self) -> DatabaseFlags {
        match self.keys {
            KeyKind::Text => DatabaseFlags::empty(),
            KeyKind::Integer => DatabaseFlags::INTEGER_KEY,
        }
    }

    fn open_env(&self, map_size: usize, flags: EnvFlags) -> Result<Env> {
        let mut options = EnvOpenOptions::new();
        options.map_size(map_size);
        // SAFETY: the harness is the only user of the file while a trial runs
        unsafe {
            options.flags(flags);
        }
        // SAFETY: same as above, nothing else maps the file
        let env = unsafe { options.open(&self.path)? };
        Ok(env)
    }

    // the env must be closed by the caller whatever this returns
    fn load(&self, env: &Env, n: u64) -> Result<u64> {
        let mut wtxn = env.write_txn()?;
        let db: Database<Bytes, Bytes> = env
            .database_options()
            .types::<Bytes, Bytes>()
            .flags(self.db_flags())
            .create(&mut wtxn)?;

        let mut record = RecordBuf::new(self.keys);
        let mut pending = 0;
        for i in 0..n {
            let (key, value) = record.format(i);
            db.put_with_flags(&mut wtxn, PutFlags::APPEND, key, value)?;
            pending += 1;
            if pending == self.batch_size {
                wtxn.commit()?;
                wtxn = env.write_txn()?;
                pending = 0;
            }
        }
        wtxn.commit()?;

        let page_size = {
            let rtxn = env.read_txn()?;
            db.stat(&rtxn)?.page_size as u64
        };
        let last_page = env.info().last_page_number as u64;
        log::debug!("[LMDB] page size {}, last page {}", page_size, last_page);
        Ok(page_size * last_page)
    }

    fn lookup(&self, env: &Env, n: u64, lookups: u64, rng: &mut dyn RngCore) -> Result<()> {
        let rtxn = env.read_txn()?;
        let db = env
            .database_options()
            .types::<Bytes, Bytes>()
            .flags(self.db_flags())
            .open(&rtxn)?
            .ok_or_else(|| anyhow::anyhow!("main database of {} is missing", self.path.display()))?;

        verify_lookups(n, lookups, rng, self.keys, |key, expected| {
            let found = db.get(&rtxn, key)?;
            Ok(Probe::check(found, expected))
        })
    }
}

impl Candidate for LmdbCandidate {
    fn name(&self) -> &str {
        &self.name
    }

    fn populate(&self, n: u64) -> Result<u64> {
        let env = self.open_env(
            Self::map_size(n),
            EnvFlags::NO_SYNC | EnvFlags::WRITE_MAP | EnvFlags::NO_SUB_DIR,
        )?;
        let result = self.load(&env, n);
        env.prepare_for_closing().wait();
        result
    }

    fn verify(&self, n: u64, lookups: u64, rng: &mut dyn RngCore) -> Result<()> {
        let env = self.open_env(
            Self::MIN_MAP_SIZE,
            EnvFlags::READ_ONLY | EnvFlags::NO_SUB_DIR,
        )?;
        let result = self.lookup(&env, n, lookups, rng);
        env.prepare_for_closing().wait();
        result
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        vec![self.path.clone(), self.lock_path.clone()]
    }
}

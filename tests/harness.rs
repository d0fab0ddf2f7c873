use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, EnvFlags, EnvOpenOptions};
use kvbench::artifacts;
use kvbench::engines::{registry, LmdbCandidate, RedbCandidate, SledCandidate};
use kvbench::record::KeyKind;
use kvbench::runner::Phase;
use kvbench::{BenchError, Candidate, HarnessConfig, Result, Runner, Trial};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tempfile::TempDir;
use walkdir::WalkDir;

fn config(dir: &TempDir) -> HarnessConfig {
    HarnessConfig::new(dir.path()).with_seed(2013)
}

fn leftovers(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap().into_path())
        .collect()
}

fn round_trip(candidate: &dyn Candidate, dir: &TempDir, n: u64, lookups: u64) {
    let mut runner = Runner::new(&config(dir), Vec::new());
    let report = runner.run(candidate, Trial::new(n, lookups)).unwrap();
    assert!(report.data_size > 0);
    assert!(report.file_size > 0);
    assert!(report.puts.per_sec.is_finite() && report.puts.per_sec > 0.0);
    assert!(report.lookups.per_sec.is_finite() && report.lookups.per_sec > 0.0);
    assert!(leftovers(dir.path()).is_empty(), "{:?}", leftovers(dir.path()));
}

// 1000 records, a million lookups, nothing left behind
#[test]
fn lmdb_thousand_records_million_lookups() {
    let dir = TempDir::new().unwrap();
    let candidate = LmdbCandidate::new(&config(&dir), KeyKind::Text);
    round_trip(&candidate, &dir, 1000, 1_000_000);
}

#[test]
fn lmdb_integer_keys_round_trip() {
    let dir = TempDir::new().unwrap();
    let candidate = LmdbCandidate::new(&config(&dir), KeyKind::Integer);
    round_trip(&candidate, &dir, 5_000, 50_000);
}

#[test]
fn sled_round_trip() {
    let dir = TempDir::new().unwrap();
    let candidate = SledCandidate::new(&config(&dir));
    round_trip(&candidate, &dir, 5_000, 20_000);
}

#[test]
fn sled_compressed_round_trip() {
    let dir = TempDir::new().unwrap();
    let candidate = SledCandidate::compressed(&config(&dir));
    round_trip(&candidate, &dir, 5_000, 20_000);
}

#[test]
fn redb_round_trip() {
    let dir = TempDir::new().unwrap();
    let candidate = RedbCandidate::new(&config(&dir));
    round_trip(&candidate, &dir, 5_000, 20_000);
}

#[test]
fn partial_last_batch_is_committed() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_batch_size(300);
    let candidates: Vec<Box<dyn Candidate>> = vec![
        Box::new(LmdbCandidate::new(&config, KeyKind::Text)),
        Box::new(SledCandidate::new(&config)),
        Box::new(RedbCandidate::new(&config)),
    ];
    for candidate in &candidates {
        // 1000 = 3 full batches + 100, lookups cover the tail with certainty
        round_trip(candidate.as_ref(), &dir, 1000, 200_000);
    }
}

#[test]
fn populate_then_verify_directly() {
    let dir = TempDir::new().unwrap();
    let candidate = LmdbCandidate::new(&config(&dir), KeyKind::Text);
    let paths = candidate.artifacts();
    assert_eq!(artifacts::total_size(&paths).unwrap(), 0);

    candidate.populate(2000).unwrap();
    artifacts::ensure_present(&paths).unwrap();
    assert!(artifacts::total_size(&paths).unwrap() > 0);
    let mut rng = rand::thread_rng();
    candidate.verify(2000, 10_000, &mut rng).unwrap();

    artifacts::remove_all(&paths).unwrap();
    artifacts::remove_all(&paths).unwrap();
    assert_eq!(artifacts::total_size(&paths).unwrap(), 0);
}

#[test]
fn sizes_grow_with_record_count() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    for candidate in &registry(&config) {
        let mut runner = Runner::new(&config, Vec::new());
        let small = runner.run(candidate.as_ref(), Trial::new(1_000, 1_000)).unwrap();
        let large = runner.run(candidate.as_ref(), Trial::new(100_000, 1_000)).unwrap();
        assert!(small.data_size < large.data_size, "{}", candidate.name());
        assert!(small.file_size <= large.file_size, "{}", candidate.name());
    }
}

// every engine must report keys it never stored, and close cleanly enough
// afterwards for the same candidate to run the next trial
#[test]
fn missing_keys_fail_and_candidate_stays_usable() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut rng = SmallRng::seed_from_u64(5);
    for candidate in &registry(&config) {
        let name = candidate.name();
        candidate.populate(10).unwrap();
        let err = candidate.verify(1000, 1000, &mut rng).unwrap_err();
        match err.downcast_ref::<BenchError>() {
            Some(BenchError::Missing { .. }) => {}
            other => panic!("{}: unexpected error {:?}", name, other),
        }
        assert!(err.to_string().starts_with("Failed to lookup key: "), "{}", name);
        artifacts::remove_all(&candidate.artifacts()).unwrap();

        candidate.populate(10).unwrap();
        candidate.verify(10, 100, &mut rng).unwrap();
        artifacts::remove_all(&candidate.artifacts()).unwrap();

        let mut runner = Runner::new(&config, Vec::new());
        runner
            .run(candidate.as_ref(), Trial::new(100, 1000))
            .unwrap_or_else(|abort| panic!("{}: {}", name, abort));
        assert!(leftovers(dir.path()).is_empty(), "{}", name);
    }
}

#[test]
fn missing_keys_abort_a_trial() {
    let dir = TempDir::new().unwrap();
    let candidate = ShortLoad {
        inner: LmdbCandidate::new(&config(&dir), KeyKind::Integer),
    };
    let mut runner = Runner::new(&config(&dir), Vec::new());
    let abort = runner.run(&candidate, Trial::new(1000, 10_000)).unwrap_err();
    assert_eq!(abort.phase(), Phase::LookingUp);
    assert_eq!(abort.exit_code(), 1);
    assert!(abort.diagnostic().contains("Failed to lookup key: "), "{}", abort);
    assert!(leftovers(dir.path()).is_empty());

    // same candidate, same process: the next trial starts from a clean slate
    runner.run(&candidate.inner, Trial::new(1000, 10_000)).unwrap();
}

/// Loads only the first half of the requested records.
struct ShortLoad {
    inner: LmdbCandidate,
}

impl Candidate for ShortLoad {
    fn name(&self) -> &str {
        "short LMDB"
    }

    fn populate(&self, n: u64) -> Result<u64> {
        self.inner.populate(n / 2)
    }

    fn verify(&self, n: u64, lookups: u64, rng: &mut dyn RngCore) -> Result<()> {
        self.inner.verify(n, lookups, rng)
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        self.inner.artifacts()
    }
}

/// LMDB whose stored value for record 42 is cut short after loading.
struct CorruptedLmdb {
    inner: LmdbCandidate,
}

impl CorruptedLmdb {
    fn corrupt(&self) -> Result<()> {
        let mut options = EnvOpenOptions::new();
        options.map_size(1 << 20);
        unsafe {
            options.flags(EnvFlags::NO_SUB_DIR);
        }
        let env = unsafe { options.open(self.inner.path())? };
        {
            let mut wtxn = env.write_txn()?;
            let db: Database<Bytes, Bytes> = env
                .open_database(&wtxn, None)?
                .expect("main database");
            db.put(&mut wtxn, &b"key_000000042"[..], &b"value_4"[..])?;
            wtxn.commit()?;
        }
        env.prepare_for_closing().wait();
        Ok(())
    }
}

impl Candidate for CorruptedLmdb {
    fn name(&self) -> &str {
        "corrupted LMDB"
    }

    fn populate(&self, n: u64) -> Result<u64> {
        let size = self.inner.populate(n)?;
        self.corrupt()?;
        Ok(size)
    }

    fn verify(&self, n: u64, lookups: u64, rng: &mut dyn RngCore) -> Result<()> {
        self.inner.verify(n, lookups, rng)
    }

    fn artifacts(&self) -> Vec<PathBuf> {
        self.inner.artifacts()
    }
}

#[test]
fn corrupted_value_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let candidate = CorruptedLmdb {
        inner: LmdbCandidate::new(&config(&dir), KeyKind::Text),
    };
    let mut runner = Runner::new(&config(&dir), Vec::new());
    let abort = runner
        .run(&candidate, Trial::new(1000, 1_000_000))
        .unwrap_err();

    assert_eq!(abort.phase(), Phase::LookingUp);
    assert_eq!(abort.exit_code(), 1);
    let diagnostic = abort.diagnostic();
    assert!(diagnostic.contains(": assertion failed: "), "{}", diagnostic);
    assert!(
        diagnostic.ends_with("Did not get the expected value for key: key_000000042"),
        "{}",
        diagnostic
    );
    assert!(leftovers(dir.path()).is_empty());

    // the lookup report is never printed for a failed trial
    let text = String::from_utf8(runner.into_inner()).unwrap();
    assert!(text.contains("data size:"));
    assert!(!text.contains("lookup time"));
}

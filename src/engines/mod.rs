//! benchmarked engines

use crate::candidate::Candidate;
use crate::config::HarnessConfig;
use crate::record::KeyKind;

pub mod lmdb;
pub mod redb;
pub mod sled;

pub use self::lmdb::LmdbCandidate;
pub use self::redb::RedbCandidate;
pub use self::sled::SledCandidate;

/// Every candidate of a full run, in benchmark order.
pub fn registry(config: &HarnessConfig) -> Vec<Box<dyn Candidate>> {
    vec![
        Box::new(LmdbCandidate::new(config, KeyKind::Text)),
        Box::new(LmdbCandidate::new(config, KeyKind::Integer)),
        Box::new(SledCandidate::new(config)),
        Box::new(SledCandidate::compressed(config)),
        Box::new(RedbCandidate::new(config)),
    ]
}

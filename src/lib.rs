#![warn(missing_docs)]
//! a benchmark harness for embedded key/value stores
pub use candidate::Candidate;
pub use config::HarnessConfig;
pub use error::{Abort, BenchError};
pub use runner::{Runner, Trial};

pub mod artifacts;
pub mod candidate;
pub mod clock;
pub mod config;
pub mod engines;
pub mod error;
pub mod logger;
pub mod matrix;
pub mod record;
pub mod report;
pub mod runner;

/// simply type
pub type Result<T> = std::result::Result<T, anyhow::Error>;

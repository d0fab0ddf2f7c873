//! self defined error type

use std::io;
use std::panic::Location;

use thiserror::Error;

use crate::runner::Phase;

#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Did not get the expected value for key: {key}")]
    Mismatch { key: String },
    #[error("Failed to lookup key: {key}")]
    Missing { key: String },
    #[error("Invalid trial, {reason}")]
    InvalidTrial { reason: String },
    #[error("Artifact {path} was not created")]
    MissingArtifact { path: String },
}

/// A fatal harness failure, remembering where it was observed.
///
/// Every failure aborts the whole run, so there is no recovery path: the
/// entry point prints [`Abort::diagnostic`] and exits with [`Abort::exit_code`].
#[derive(Debug)]
pub struct Abort {
    location: &'static Location<'static>,
    phase: Phase,
    error: anyhow::Error,
}

impl Abort {
    /// Wrap `error`, recording the caller's source location.
    #[track_caller]
    pub fn new(phase: Phase, error: anyhow::Error) -> Self {
        Abort {
            location: Location::caller(),
            phase,
            error,
        }
    }

    /// The phase the trial was in when it failed.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The underlying error chain.
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// `<file>:<line>: assertion failed: <error-description>`
    pub fn diagnostic(&self) -> String {
        format!(
            "{}:{}: assertion failed: {:#}",
            self.location.file(),
            self.location.line(),
            self.error
        )
    }

    /// The process exit code matching the innermost error that carries one.
    pub fn exit_code(&self) -> i32 {
        let code = self
            .error
            .chain()
            .find_map(error_code)
            .unwrap_or(1);
        // an error reporting zero must still fail the process
        if code == 0 {
            1
        } else {
            code
        }
    }
}

impl std::fmt::Display for Abort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.diagnostic())
    }
}

fn error_code(err: &(dyn std::error::Error + 'static)) -> Option<i32> {
    if err.is::<BenchError>() {
        return Some(1);
    }
    if let Some(e) = err.downcast_ref::<heed::Error>() {
        return match e {
            heed::Error::Mdb(mdb) => Some(mdb.to_err_code()),
            heed::Error::Io(io) => io.raw_os_error(),
            _ => Some(1),
        };
    }
    if let Some(e) = err.downcast_ref::<io::Error>() {
        return e.raw_os_error();
    }
    if let Some(e) = err.downcast_ref::<walkdir::Error>() {
        return e.io_error().and_then(io::Error::raw_os_error);
    }
    None
}

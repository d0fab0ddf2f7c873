//! human readable per trial report

use std::io::{self, Write};

use crate::clock::{format_secs, PhaseTiming, Throughput};
use crate::runner::Trial;

/// Metrics of one completed trial.
#[derive(Clone, Debug)]
pub struct TrialReport {
    /// candidate name
    pub candidate: String,
    /// requested scale
    pub trial: Trial,
    /// populate phase timing
    pub creation: PhaseTiming,
    /// records written per second
    pub puts: Throughput,
    /// size reported by the engine itself
    pub data_size: u64,
    /// bytes of all artifact files
    pub file_size: u64,
    /// lookup phase timing
    pub lookup: PhaseTiming,
    /// lookups per second
    pub lookups: Throughput,
}

pub(crate) fn header(out: &mut impl Write, name: &str, trial: &Trial) -> io::Result<()> {
    writeln!(
        out,
        "Testing bulk insert of {} elements and {} random lookups",
        trial.records, trial.lookups
    )?;
    writeln!(out, "  Candidate: {}", name)?;
    out.flush()
}

pub(crate) fn creation(
    out: &mut impl Write,
    timing: &PhaseTiming,
    puts: &Throughput,
    data_size: u64,
    file_size: u64,
) -> io::Result<()> {
    writeln!(out, "    creation time (wall):     {}", format_secs(timing.wall))?;
    writeln!(out, "    creation time (ucpu):     {}", format_secs(timing.user))?;
    writeln!(out, "    creation time (scpu):     {}", format_secs(timing.system))?;
    let label = format!("throughput (puts/{}):", puts.denominator);
    writeln!(out, "    {:<26}{:.2}", label, puts.per_sec)?;
    writeln!(out, "    data size:                {}", data_size)?;
    writeln!(out, "    file size:                {}", file_size)?;
    out.flush()
}

pub(crate) fn lookup(out: &mut impl Write, timing: &PhaseTiming, lookups: &Throughput) -> io::Result<()> {
    writeln!(out, "    lookup time (wall):          {}", format_secs(timing.wall))?;
    writeln!(out, "    lookup time (ucpu):          {}", format_secs(timing.user))?;
    writeln!(out, "    lookup time (scpu):          {}", format_secs(timing.system))?;
    let label = format!("throughput (lookups/{}):", lookups.denominator);
    writeln!(out, "    {:<29}{:.2}", label, lookups.per_sec)?;
    writeln!(out)?;
    out.flush()
}

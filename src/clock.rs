//! wall clock and process cpu clock

use std::fmt;
use std::time::{Duration, Instant};

use crate::Result;

/// Smallest interval used as a throughput denominator.
pub const MIN_INTERVAL: Duration = Duration::from_micros(1);

/// Whether this platform reports user and system cpu time separately.
pub const CPU_SPLIT: bool = cfg!(unix);

/// Cumulative cpu time consumed by this process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTime {
    /// time spent in user mode
    pub user: Duration,
    /// time spent in the kernel on behalf of the process
    pub system: Duration,
}

impl CpuTime {
    /// Read the process cpu clock.
    #[cfg(unix)]
    pub fn now() -> Result<Self> {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
        // SAFETY: getrusage only writes into the provided struct
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            Err(std::io::Error::last_os_error())?
        }
        // SAFETY: initialized by the successful call above
        let usage = unsafe { usage.assume_init() };
        Ok(CpuTime {
            user: timeval_to_duration(usage.ru_utime),
            system: timeval_to_duration(usage.ru_stime),
        })
    }

    /// Platforms without a split cpu clock count wall time since the first
    /// reading as user time, report zero system time, and the harness
    /// normalises throughput by wall time.
    #[cfg(not(unix))]
    pub fn now() -> Result<Self> {
        static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let start = *START.get_or_init(Instant::now);
        Ok(CpuTime {
            user: start.elapsed(),
            system: Duration::ZERO,
        })
    }

    /// user + system
    pub fn total(&self) -> Duration {
        self.user + self.system
    }
}

#[cfg(unix)]
fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::new(tv.tv_sec.max(0) as u64, (tv.tv_usec.max(0) as u32) * 1000)
}

/// Wall and cpu clocks read together at a phase boundary.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot {
    wall: Instant,
    cpu: CpuTime,
}

impl Snapshot {
    /// Read both clocks.
    pub fn take() -> Result<Self> {
        let cpu = CpuTime::now()?;
        Ok(Snapshot {
            wall: Instant::now(),
            cpu,
        })
    }

    /// The timing of the phase that started at `start` and ends at `self`.
    pub fn since(&self, start: &Snapshot) -> PhaseTiming {
        PhaseTiming {
            wall: self.wall.saturating_duration_since(start.wall),
            user: self.cpu.user.saturating_sub(start.cpu.user),
            system: self.cpu.system.saturating_sub(start.cpu.system),
            cpu_split: CPU_SPLIT,
        }
    }
}

/// Elapsed time of one phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseTiming {
    /// real elapsed time
    pub wall: Duration,
    /// user cpu time
    pub user: Duration,
    /// system cpu time
    pub system: Duration,
    /// false when the platform could not measure cpu time
    pub cpu_split: bool,
}

impl PhaseTiming {
    /// user + system
    pub fn cpu(&self) -> Duration {
        self.user + self.system
    }
}

/// Which clock a throughput figure was normalised by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denominator {
    /// cpu seconds, the normal case
    Cpu,
    /// wall seconds, because cpu time was zero or unavailable
    Wall,
}

impl fmt::Display for Denominator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denominator::Cpu => f.write_str("cpusec"),
            Denominator::Wall => f.write_str("wallsec"),
        }
    }
}

/// Operations per second for one phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Throughput {
    /// operations per second
    pub per_sec: f64,
    /// clock the rate was computed against
    pub denominator: Denominator,
}

/// `count` divided by the phase's cpu seconds, or by its wall seconds when
/// the cpu interval is below measurement resolution.
pub fn throughput(count: u64, timing: &PhaseTiming) -> Throughput {
    let cpu = timing.cpu();
    let (interval, denominator) = if timing.cpu_split && !cpu.is_zero() {
        (cpu, Denominator::Cpu)
    } else {
        (timing.wall, Denominator::Wall)
    };
    let secs = interval.max(MIN_INTERVAL).as_secs_f64();
    Throughput {
        per_sec: count as f64 / secs,
        denominator,
    }
}

/// `S.UUUUUU`
pub fn format_secs(d: Duration) -> String {
    format!("{}.{:06}", d.as_secs(), d.subsec_micros())
}

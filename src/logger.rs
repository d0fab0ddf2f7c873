//! logger setup

use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env};

/// Init the global logger. Level comes from `RUST_LOG`, default `info`.
///
/// Records go to stderr so they never interleave with the report on stdout.
pub fn init_logger() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .try_init();
}

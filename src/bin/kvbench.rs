use std::io;
use std::process::exit;

use clap::Parser;

use kvbench::{engines, matrix, HarnessConfig, Result, Runner};

/// Bulk load and random lookup benchmark of embedded key/value stores.
///
/// Every candidate is loaded with 10^3 up to 10^8 records followed by 10^6
/// verified random lookups. Files are created in the current directory.
/// The run is fixed: any argument is rejected.
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Opt {}

fn main() -> Result<()> {
    kvbench::logger::init_logger();
    let _opt = Opt::parse();
    log::info!("version={}", env!("CARGO_PKG_VERSION"));

    let config = HarnessConfig::new(std::env::current_dir()?);
    log::info!("workdir={}", config.workdir.display());
    let candidates = engines::registry(&config);
    let trials = matrix::trials();

    let stdout = io::stdout();
    let mut runner = Runner::new(&config, stdout.lock());
    let result = matrix::run_all(&mut runner, &candidates, &trials);
    drop(runner);
    if let Err(abort) = result {
        println!("{}", abort.diagnostic());
        exit(abort.exit_code());
    }
    Ok(())
}

mod driver;
mod report;

use std::io::Write;

use anyhow::Result;

use crate::driver::{Driver, DriverConfig};

fn main() -> Result<()> {
    common::log_setup::setup_logging("info");

    if common::is_debug() {
        tracing::warn!("debug build: timings are not representative, run with --release");
    }

    let driver = Driver::new(DriverConfig::default())?;
    let config = driver.config();
    tracing::info!(
        len = config.sample.len,
        runs = driver.runs(),
        workers = config.reduction.worker_count,
        simd = common::cpu_features::simd_level(),
        "starting benchmark"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut outcomes = Vec::with_capacity(driver.runs());
    for run in 0..driver.runs() {
        let outcome = driver.run_once(run)?;
        report::write_run(&mut out, &outcome)?;
        tracing::debug!(run = outcome.run, seed = outcome.seed, "run complete");
        outcomes.push(outcome);
    }

    writeln!(out)?;
    for summary in report::summarize(&outcomes) {
        writeln!(out, "{summary}")?;
    }

    Ok(())
}

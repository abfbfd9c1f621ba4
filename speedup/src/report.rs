//! Console output for benchmark runs.

use std::fmt;
use std::io::{self, Write};

use moments::{ReductionResult, StrategyKind};

use crate::driver::RunOutcome;

// ANSI color codes
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const CYAN: &str = "\x1b[36m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const DIM: &str = "\x1b[2m";
}

pub fn write_result<W: Write>(
    out: &mut W,
    label: &str,
    result: &ReductionResult,
) -> io::Result<()> {
    writeln!(out, "* {label} execution : ")?;
    writeln!(out, "Average Value : {:.6}", result.mean)?;
    writeln!(out, "Result Standard Deviation : {:.6}", result.stdev)?;
    writeln!(out, "Execution Time : {} us", result.elapsed_micros())
}

pub fn write_run<W: Write>(out: &mut W, outcome: &RunOutcome) -> io::Result<()> {
    write_result(out, StrategyKind::Serial.name(), &outcome.serial)?;
    for parallel in &outcome.parallel {
        writeln!(out)?;
        write_result(out, parallel.strategy.name(), &parallel.result)?;
        match parallel.speed_up {
            Some(ratio) => writeln!(out, "\nSpeed up : {ratio:.6}")?,
            None => writeln!(out, "\nSpeed up : n/a")?,
        }
    }
    writeln!(out, "\n*************")
}

/// Speed-up statistics for one strategy across all runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedUpSummary {
    pub strategy: StrategyKind,
    pub runs: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl SpeedUpSummary {
    /// Returns `None` when no run produced a measurable ratio.
    pub fn from_ratios(strategy: StrategyKind, ratios: &[f64]) -> Option<Self> {
        if ratios.is_empty() {
            return None;
        }
        let mut sorted = ratios.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            strategy,
            runs: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: sorted[sorted.len() / 2],
        })
    }
}

impl fmt::Display for SpeedUpSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use colors::*;
        write!(
            f,
            "{CYAN}{BOLD}[SPEED UP]{RESET} {BOLD}{}{RESET}: {YELLOW}{:.3}x{RESET} {DIM}(min: {:.3}x, max: {:.3}x, median: {:.3}x, {} runs){RESET}",
            self.strategy, self.mean, self.min, self.max, self.median, self.runs
        )
    }
}

/// One summary per parallel strategy, in the order they were run.
pub fn summarize(outcomes: &[RunOutcome]) -> Vec<SpeedUpSummary> {
    let Some(first) = outcomes.first() else {
        return Vec::new();
    };
    first
        .parallel
        .iter()
        .filter_map(|p| {
            let ratios: Vec<f64> = outcomes
                .iter()
                .flat_map(|o| o.parallel.iter())
                .filter(|q| q.strategy == p.strategy)
                .filter_map(|q| q.speed_up)
                .collect();
            SpeedUpSummary::from_ratios(p.strategy, &ratios)
        })
        .collect()
}

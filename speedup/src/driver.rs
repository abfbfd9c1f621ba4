//! Benchmark orchestration: one serial baseline per run, then every parallel
//! strategy on the same sample.

use moments::{
    ArraySource, ReductionConfig, ReductionResult, SampleConfig, Strategy, StrategyKind, speed_up,
};

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub sample: SampleConfig,
    pub reduction: ReductionConfig,
    pub runs: usize,
    /// Strategies compared against the serial baseline, in report order.
    pub parallel: Vec<StrategyKind>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            sample: SampleConfig::default(),
            reduction: ReductionConfig::default(),
            runs: 1,
            parallel: vec![
                StrategyKind::Concurrent,
                StrategyKind::DataParallel,
                StrategyKind::Vector,
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParallelRun {
    pub strategy: StrategyKind,
    pub result: ReductionResult,
    pub speed_up: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run: usize,
    pub seed: u64,
    pub serial: ReductionResult,
    pub parallel: Vec<ParallelRun>,
}

#[derive(Debug)]
pub struct Driver {
    config: DriverConfig,
    serial: Box<dyn Strategy>,
    parallel: Vec<(StrategyKind, Box<dyn Strategy>)>,
}

impl Driver {
    pub fn new(config: DriverConfig) -> moments::Result<Self> {
        let serial = StrategyKind::Serial.build(&config.reduction)?;
        let parallel = config
            .parallel
            .iter()
            .map(|&kind| Ok((kind, kind.build(&config.reduction)?)))
            .collect::<moments::Result<Vec<_>>>()?;
        Ok(Self {
            config,
            serial,
            parallel,
        })
    }

    pub fn runs(&self) -> usize {
        self.config.runs
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Sample settings for `run`: consecutive seeds from a configured base,
    /// otherwise left unset so each run draws a fresh clock seed.
    fn sample_config_for(&self, run: usize) -> SampleConfig {
        SampleConfig {
            seed: self.config.sample.seed.map(|base| base.wrapping_add(run as u64)),
            ..self.config.sample.clone()
        }
    }

    pub fn run_once(&self, run: usize) -> moments::Result<RunOutcome> {
        let (sample, seed) = ArraySource::from_config(&self.sample_config_for(run))?;
        tracing::info!(run, seed, len = sample.len(), "generated sample");

        let serial = self.serial.compute(&sample)?;
        let parallel = self
            .parallel
            .iter()
            .map(|(kind, strategy)| {
                let result = strategy.compute(&sample)?;
                Ok(ParallelRun {
                    strategy: *kind,
                    speed_up: speed_up(&serial, &result),
                    result,
                })
            })
            .collect::<moments::Result<Vec<_>>>()?;

        Ok(RunOutcome {
            run,
            seed,
            serial,
            parallel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> DriverConfig {
        DriverConfig {
            sample: SampleConfig {
                len: 4096,
                max_value: 100.0,
                seed: Some(10),
            },
            reduction: ReductionConfig::default().with_worker_count(2),
            runs: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_matches_reference_benchmark() {
        let config = DriverConfig::default();
        assert_eq!(config.sample.len, 1 << 20);
        assert_eq!(config.runs, 1);
        assert_eq!(config.parallel.len(), 3);
    }

    #[test]
    fn test_run_once_covers_every_parallel_strategy() {
        let driver = Driver::new(small_config()).unwrap();
        let outcome = driver.run_once(0).unwrap();
        assert_eq!(outcome.seed, 10);
        let kinds: Vec<StrategyKind> = outcome.parallel.iter().map(|p| p.strategy).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::Concurrent,
                StrategyKind::DataParallel,
                StrategyKind::Vector
            ]
        );
        for p in &outcome.parallel {
            assert!(((p.result.mean - outcome.serial.mean) / outcome.serial.mean).abs() < 1e-3);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let driver = Driver::new(small_config()).unwrap();
        let first = driver.run_once(1).unwrap();
        let again = driver.run_once(1).unwrap();
        assert_eq!(first.seed, 11);
        assert_eq!(first.serial.mean, again.serial.mean);
        assert_ne!(driver.run_once(2).unwrap().serial.mean, first.serial.mean);
    }

    #[test]
    fn test_unseeded_runs_draw_a_clock_seed() {
        let mut config = small_config();
        config.sample.seed = None;
        let driver = Driver::new(config).unwrap();
        assert_eq!(driver.sample_config_for(3).seed, None);
        assert!(driver.run_once(0).is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let mut config = small_config();
        config.reduction.worker_count = 0;
        assert!(Driver::new(config).is_err());
    }

    #[test]
    fn test_vector_input_error_propagates() {
        let mut config = small_config();
        config.sample.len = 4095;
        let driver = Driver::new(config).unwrap();
        assert!(matches!(
            driver.run_once(0),
            Err(moments::Error::InvalidInputSize { len: 4095, .. })
        ));
    }
}

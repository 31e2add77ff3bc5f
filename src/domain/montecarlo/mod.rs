//! Monte Carlo backtest engine.
//!
//! Paths are independent: each draws from its own RNG, seeded by hashing the
//! master seed with the path index, so a run reproduces exactly whether its
//! paths execute on the rayon pool or one after another.

pub mod aggregate;
pub mod bootstrap;
pub mod path;

pub use aggregate::{aggregate, AggregateStatistics};
pub use path::PathResult;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::candle::{validate_series, Candle};
use crate::domain::config::{EmpiricalParams, MonteCarloConfig, ParametricParams};
use crate::domain::error::SigbenchError;
use crate::domain::simulator::{ReplayBuffer, TradeSimulator};

/// Shared flag that stops paths which have not started yet.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Derive the RNG seed of path `index` from the master seed.
pub fn path_seed(master_seed: u64, index: u64) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(&index.to_le_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

pub fn path_rng(master_seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(path_seed(master_seed, index as u64))
}

/// What each path simulates.
#[derive(Debug, Clone, Copy)]
pub enum PathSource<'a> {
    Parametric(ParametricParams),
    Empirical {
        params: EmpiricalParams,
        history: &'a [Candle],
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloReport {
    pub statistics: AggregateStatistics,
    /// Completed paths ordered by index, failed ones included.
    pub paths: Vec<PathResult>,
}

#[derive(Debug, Clone)]
pub struct MonteCarloEngine {
    config: MonteCarloConfig,
    simulator: TradeSimulator,
    parallel: bool,
}

impl MonteCarloEngine {
    pub fn new(config: MonteCarloConfig) -> Self {
        MonteCarloEngine {
            config,
            simulator: TradeSimulator::default(),
            parallel: true,
        }
    }

    /// Share a replay buffer with other simulators.
    pub fn with_replay(mut self, replay: Arc<ReplayBuffer>) -> Self {
        self.simulator = TradeSimulator::new(replay);
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    pub fn replay(&self) -> &Arc<ReplayBuffer> {
        self.simulator.replay()
    }

    pub fn run(&self, source: &PathSource<'_>) -> Result<MonteCarloReport, SigbenchError> {
        self.run_with_progress(source, &CancellationToken::new(), |_| {})
    }

    /// Run every path, reporting the completed fraction after each one.
    ///
    /// Once `cancel` is set no further paths start; the report then covers
    /// only the paths that completed and is flagged as cancelled.
    pub fn run_with_progress<F>(
        &self,
        source: &PathSource<'_>,
        cancel: &CancellationToken,
        progress: F,
    ) -> Result<MonteCarloReport, SigbenchError>
    where
        F: Fn(f64) + Send + Sync,
    {
        if let PathSource::Empirical { params, history } = source {
            validate_series(history)?;
            let minimum = params.strategy.warmup_bars + 2;
            if history.len() < minimum {
                return Err(SigbenchError::InsufficientHistory {
                    bars: history.len(),
                    minimum,
                });
            }
        }

        let total = self.config.num_paths;
        info!(
            paths = total,
            seed = self.config.seed,
            mode = %self.config.mode,
            parallel = self.parallel,
            "starting Monte Carlo run"
        );

        let done = AtomicUsize::new(0);
        let run_path = |index: usize| -> Option<PathResult> {
            if cancel.is_cancelled() {
                return None;
            }
            let result = self.simulate_path(source, index);
            let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
            progress(completed as f64 / total as f64);
            Some(result)
        };

        let mut paths: Vec<PathResult> = if self.parallel {
            (0..total).into_par_iter().filter_map(run_path).collect()
        } else {
            (0..total).filter_map(run_path).collect()
        };
        paths.sort_by_key(|p| p.index);

        let cancelled = cancel.is_cancelled() && paths.len() < total;
        let statistics = aggregate(&paths, total, self.config.initial_balance, cancelled);

        if statistics.failed_paths > 0 {
            warn!(failed = statistics.failed_paths, "paths excluded after non-finite balances");
        }
        if cancelled {
            warn!(
                completed = statistics.completed_paths,
                requested = total,
                "Monte Carlo run cancelled"
            );
        }
        info!(
            completed = statistics.completed_paths,
            mean_final_balance = statistics.mean_final_balance,
            win_rate = statistics.win_rate,
            "Monte Carlo run finished"
        );

        Ok(MonteCarloReport { statistics, paths })
    }

    fn simulate_path(&self, source: &PathSource<'_>, index: usize) -> PathResult {
        let mut rng = path_rng(self.config.seed, index);
        match source {
            PathSource::Parametric(params) => path::simulate_parametric(
                index,
                self.config.initial_balance,
                self.config.risk_free_rate,
                params,
                &mut rng,
            ),
            PathSource::Empirical { params, history } => path::simulate_empirical(
                index,
                self.config.initial_balance,
                self.config.risk_free_rate,
                params,
                history,
                &self.simulator,
                &mut rng,
            ),
        }
    }
}

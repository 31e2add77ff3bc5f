//! Validated run configuration.
//!
//! Each configuration type is assembled through a consuming builder whose
//! `build()` rejects out-of-range values, so a constructed value is always
//! usable by the engine.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SigbenchError;

pub const DEFAULT_PATHS: usize = 1000;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_BLOCK_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationMode {
    Parametric,
    Empirical,
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationMode::Parametric => write!(f, "parametric"),
            SimulationMode::Empirical => write!(f, "empirical"),
        }
    }
}

impl FromStr for SimulationMode {
    type Err = SigbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parametric" => Ok(SimulationMode::Parametric),
            "empirical" => Ok(SimulationMode::Empirical),
            other => Err(SigbenchError::invalid(
                "montecarlo",
                "mode",
                format!("unknown mode '{}', expected parametric or empirical", other),
            )),
        }
    }
}

fn require_finite(section: &str, key: &str, value: f64) -> Result<f64, SigbenchError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SigbenchError::invalid(section, key, "must be a finite number"))
    }
}

fn require_positive(section: &str, key: &str, value: f64) -> Result<f64, SigbenchError> {
    if require_finite(section, key, value)? > 0.0 {
        Ok(value)
    } else {
        Err(SigbenchError::invalid(section, key, "must be positive"))
    }
}

fn require_fraction(section: &str, key: &str, value: f64) -> Result<f64, SigbenchError> {
    if (0.0..=1.0).contains(&require_finite(section, key, value)?) {
        Ok(value)
    } else {
        Err(SigbenchError::invalid(section, key, "must be between 0 and 1"))
    }
}

fn require_count(section: &str, key: &str, value: usize) -> Result<usize, SigbenchError> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(SigbenchError::invalid(section, key, "must be at least 1"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloConfig {
    pub num_paths: usize,
    pub seed: u64,
    pub initial_balance: f64,
    /// Annual risk-free rate used by the Sharpe ratio.
    pub risk_free_rate: f64,
    pub mode: SimulationMode,
}

impl MonteCarloConfig {
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }
}

#[derive(Debug, Clone)]
pub struct MonteCarloConfigBuilder {
    num_paths: usize,
    seed: u64,
    initial_balance: f64,
    risk_free_rate: f64,
    mode: SimulationMode,
}

impl Default for MonteCarloConfigBuilder {
    fn default() -> Self {
        MonteCarloConfigBuilder {
            num_paths: DEFAULT_PATHS,
            seed: DEFAULT_SEED,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            risk_free_rate: 0.0,
            mode: SimulationMode::Parametric,
        }
    }
}

impl MonteCarloConfigBuilder {
    pub fn num_paths(mut self, num_paths: usize) -> Self {
        self.num_paths = num_paths;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn initial_balance(mut self, initial_balance: f64) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    pub fn risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    pub fn mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> Result<MonteCarloConfig, SigbenchError> {
        const SECTION: &str = "montecarlo";
        let risk_free_rate = require_finite(SECTION, "risk_free_rate", self.risk_free_rate)?;
        if !(0.0..1.0).contains(&risk_free_rate) {
            return Err(SigbenchError::invalid(
                SECTION,
                "risk_free_rate",
                "must be between 0 and 1",
            ));
        }
        Ok(MonteCarloConfig {
            num_paths: require_count(SECTION, "paths", self.num_paths)?,
            seed: self.seed,
            initial_balance: require_positive(SECTION, "initial_balance", self.initial_balance)?,
            risk_free_rate,
            mode: self.mode,
        })
    }
}

/// Fixed per-trade outcome distribution.
///
/// `avg_win` and `avg_loss` are fractional returns on the current balance,
/// so a path compounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricParams {
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub days: usize,
    pub trades_per_day: usize,
}

impl ParametricParams {
    pub fn new(
        win_rate: f64,
        avg_win: f64,
        avg_loss: f64,
        days: usize,
        trades_per_day: usize,
    ) -> Result<Self, SigbenchError> {
        const SECTION: &str = "parametric";
        let avg_loss = require_fraction(SECTION, "avg_loss", avg_loss)?;
        if avg_loss >= 1.0 {
            return Err(SigbenchError::invalid(
                SECTION,
                "avg_loss",
                "must be below 1, a full loss ends the path",
            ));
        }
        let avg_win = require_finite(SECTION, "avg_win", avg_win)?;
        if avg_win < 0.0 {
            return Err(SigbenchError::invalid(SECTION, "avg_win", "must be non-negative"));
        }
        Ok(ParametricParams {
            win_rate: require_fraction(SECTION, "win_rate", win_rate)?,
            avg_win,
            avg_loss,
            days: require_count(SECTION, "days", days)?,
            trades_per_day: require_count(SECTION, "trades_per_day", trades_per_day)?,
        })
    }

    /// Expected fractional return of a single trade.
    pub fn edge(&self) -> f64 {
        self.win_rate * self.avg_win - (1.0 - self.win_rate) * self.avg_loss
    }
}

/// How the replayed strategy turns signals into trades.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    /// Risk-adjusted confidence required to open a trade.
    pub min_confidence: f64,
    pub stop_atr_mult: f64,
    pub target_atr_mult: f64,
    /// Fraction of the balance lost if the stop is hit.
    pub risk_fraction: f64,
    pub max_holding_bars: usize,
    /// Bars of history required before the first decision.
    pub warmup_bars: usize,
}

impl StrategyParams {
    pub fn builder() -> StrategyParamsBuilder {
        StrategyParamsBuilder::default()
    }
}

#[derive(Debug, Clone)]
pub struct StrategyParamsBuilder {
    min_confidence: f64,
    stop_atr_mult: f64,
    target_atr_mult: f64,
    risk_fraction: f64,
    max_holding_bars: usize,
    warmup_bars: usize,
}

impl Default for StrategyParamsBuilder {
    fn default() -> Self {
        StrategyParamsBuilder {
            min_confidence: 0.3,
            stop_atr_mult: 2.0,
            target_atr_mult: 3.0,
            risk_fraction: 0.01,
            max_holding_bars: 20,
            warmup_bars: 50,
        }
    }
}

impl StrategyParamsBuilder {
    pub fn min_confidence(mut self, value: f64) -> Self {
        self.min_confidence = value;
        self
    }

    pub fn stop_atr_mult(mut self, value: f64) -> Self {
        self.stop_atr_mult = value;
        self
    }

    pub fn target_atr_mult(mut self, value: f64) -> Self {
        self.target_atr_mult = value;
        self
    }

    pub fn risk_fraction(mut self, value: f64) -> Self {
        self.risk_fraction = value;
        self
    }

    pub fn max_holding_bars(mut self, value: usize) -> Self {
        self.max_holding_bars = value;
        self
    }

    pub fn warmup_bars(mut self, value: usize) -> Self {
        self.warmup_bars = value;
        self
    }

    pub fn build(self) -> Result<StrategyParams, SigbenchError> {
        const SECTION: &str = "empirical";
        let risk_fraction = require_positive(SECTION, "risk_fraction", self.risk_fraction)?;
        if risk_fraction > 1.0 {
            return Err(SigbenchError::invalid(SECTION, "risk_fraction", "must not exceed 1"));
        }
        if self.warmup_bars < 2 {
            return Err(SigbenchError::invalid(SECTION, "warmup_bars", "must be at least 2"));
        }
        Ok(StrategyParams {
            min_confidence: require_fraction(SECTION, "min_confidence", self.min_confidence)?,
            stop_atr_mult: require_positive(SECTION, "stop_atr_mult", self.stop_atr_mult)?,
            target_atr_mult: require_positive(SECTION, "target_atr_mult", self.target_atr_mult)?,
            risk_fraction,
            max_holding_bars: require_count(SECTION, "max_holding_bars", self.max_holding_bars)?,
            warmup_bars: self.warmup_bars,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmpiricalParams {
    pub block_size: usize,
    pub strategy: StrategyParams,
}

impl EmpiricalParams {
    pub fn new(block_size: usize, strategy: StrategyParams) -> Result<Self, SigbenchError> {
        Ok(EmpiricalParams {
            block_size: require_count("empirical", "block_size", block_size)?,
            strategy,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Share of the blended confidence taken from the prediction port, in [0, 1].
    pub prediction_weight: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            prediction_weight: 0.0,
        }
    }
}

impl PipelineConfig {
    pub fn new(prediction_weight: f64) -> Result<Self, SigbenchError> {
        Ok(PipelineConfig {
            prediction_weight: require_fraction(
                "pipeline",
                "prediction_weight",
                prediction_weight,
            )?,
        })
    }
}

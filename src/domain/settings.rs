//! Loading run configuration from a [`ConfigPort`].
//!
//! Sections:
//! - `[montecarlo]` paths, seed, initial_balance, risk_free_rate, mode, parallel
//! - `[parametric]` win_rate, avg_win, avg_loss (required), days, trades_per_day
//! - `[empirical]` block_size, min_confidence, stop_atr_mult, target_atr_mult,
//!   risk_fraction, max_holding_bars, warmup_bars
//! - `[pipeline]` prediction_weight
//!
//! Missing optional keys take their defaults; present but malformed values
//! are errors.

use std::str::FromStr;

use crate::domain::config::{
    EmpiricalParams, MonteCarloConfig, ParametricParams, PipelineConfig, SimulationMode,
    StrategyParams, DEFAULT_BLOCK_SIZE,
};
use crate::domain::error::SigbenchError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DAYS: usize = 252;
pub const DEFAULT_TRADES_PER_DAY: usize = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub montecarlo: MonteCarloConfig,
    pub parallel: bool,
    pub parametric: Option<ParametricParams>,
    pub empirical: Option<EmpiricalParams>,
    pub pipeline: PipelineConfig,
}

fn parse<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SigbenchError>
where
    T::Err: std::fmt::Display,
{
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SigbenchError::invalid(section, key, format!("'{}': {}", raw.trim(), e))),
    }
}

fn required<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<T, SigbenchError>
where
    T::Err: std::fmt::Display,
{
    parse(config, section, key)?.ok_or_else(|| SigbenchError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

pub fn load_montecarlo(config: &dyn ConfigPort) -> Result<MonteCarloConfig, SigbenchError> {
    const SECTION: &str = "montecarlo";
    let mut builder = MonteCarloConfig::builder();
    if let Some(paths) = parse(config, SECTION, "paths")? {
        builder = builder.num_paths(paths);
    }
    if let Some(seed) = parse(config, SECTION, "seed")? {
        builder = builder.seed(seed);
    }
    if let Some(balance) = parse(config, SECTION, "initial_balance")? {
        builder = builder.initial_balance(balance);
    }
    if let Some(rate) = parse(config, SECTION, "risk_free_rate")? {
        builder = builder.risk_free_rate(rate);
    }
    if let Some(mode) = config.get_string(SECTION, "mode") {
        builder = builder.mode(mode.parse::<SimulationMode>()?);
    }
    builder.build()
}

pub fn load_parametric(config: &dyn ConfigPort) -> Result<ParametricParams, SigbenchError> {
    const SECTION: &str = "parametric";
    ParametricParams::new(
        required(config, SECTION, "win_rate")?,
        required(config, SECTION, "avg_win")?,
        required(config, SECTION, "avg_loss")?,
        parse(config, SECTION, "days")?.unwrap_or(DEFAULT_DAYS),
        parse(config, SECTION, "trades_per_day")?.unwrap_or(DEFAULT_TRADES_PER_DAY),
    )
}

pub fn load_empirical(config: &dyn ConfigPort) -> Result<EmpiricalParams, SigbenchError> {
    const SECTION: &str = "empirical";
    let mut strategy = StrategyParams::builder();
    if let Some(v) = parse(config, SECTION, "min_confidence")? {
        strategy = strategy.min_confidence(v);
    }
    if let Some(v) = parse(config, SECTION, "stop_atr_mult")? {
        strategy = strategy.stop_atr_mult(v);
    }
    if let Some(v) = parse(config, SECTION, "target_atr_mult")? {
        strategy = strategy.target_atr_mult(v);
    }
    if let Some(v) = parse(config, SECTION, "risk_fraction")? {
        strategy = strategy.risk_fraction(v);
    }
    if let Some(v) = parse(config, SECTION, "max_holding_bars")? {
        strategy = strategy.max_holding_bars(v);
    }
    if let Some(v) = parse(config, SECTION, "warmup_bars")? {
        strategy = strategy.warmup_bars(v);
    }
    EmpiricalParams::new(
        parse(config, SECTION, "block_size")?.unwrap_or(DEFAULT_BLOCK_SIZE),
        strategy.build()?,
    )
}

pub fn load_pipeline(config: &dyn ConfigPort) -> Result<PipelineConfig, SigbenchError> {
    match parse(config, "pipeline", "prediction_weight")? {
        Some(weight) => PipelineConfig::new(weight),
        None => Ok(PipelineConfig::default()),
    }
}

/// Load and validate every section.
///
/// The section for the configured mode is always loaded; the other mode's
/// section is loaded only when present.
pub fn load_settings(config: &dyn ConfigPort) -> Result<Settings, SigbenchError> {
    let montecarlo = load_montecarlo(config)?;

    let parametric = if montecarlo.mode == SimulationMode::Parametric
        || config.has_section("parametric")
    {
        Some(load_parametric(config)?)
    } else {
        None
    };
    let empirical = if montecarlo.mode == SimulationMode::Empirical
        || config.has_section("empirical")
    {
        Some(load_empirical(config)?)
    } else {
        None
    };

    Ok(Settings {
        parallel: config.get_bool("montecarlo", "parallel", true),
        montecarlo,
        parametric,
        empirical,
        pipeline: load_pipeline(config)?,
    })
}

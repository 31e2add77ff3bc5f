//! Regime-aware confidence adjustment.
//!
//! The adjuster measures the current market regime from the trailing candle
//! window, keeps a bounded history of those measurements, and rescales a raw
//! signal confidence by how tradeable the regime looks.

use std::collections::VecDeque;

use crate::domain::candle::Candle;
use crate::domain::indicator::atr::{self, latest_atr};
use crate::domain::indicator::snapshot::MAX_LOOKBACK;
use crate::domain::stats::{mean, population_stddev, unit_clamp};

pub const HISTORY_CAPACITY: usize = 100;
pub const REGIME_WINDOW: usize = 20;
pub const LONG_TREND_WINDOW: usize = 50;

/// Daily volatility the regime considers ideal.
const TARGET_VOLATILITY: f64 = 0.02;
const LIQUID_VOLUME: f64 = 1000.0;
const VOLATILITY_SPIKE_RATIO: f64 = 1.5;
const TRUE_RANGE_SPIKE_RATIO: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketRegimeSnapshot {
    /// Population stdev of simple close-to-close returns.
    pub volatility: f64,
    /// (SMA20 - SMA50) / SMA50.
    pub trend: f64,
    /// Volume consistency, 1 / (1 + coefficient of variation).
    pub volume: f64,
    pub liquidity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeFactors {
    pub normalized_volatility: f64,
    pub trend_alignment: f64,
    pub volume_consistency: f64,
    pub liquidity: f64,
}

impl RegimeFactors {
    pub fn from_regime(regime: &MarketRegimeSnapshot) -> Self {
        RegimeFactors {
            normalized_volatility: unit_clamp(
                1.0 - (regime.volatility - TARGET_VOLATILITY).abs() / TARGET_VOLATILITY,
            ),
            trend_alignment: unit_clamp(regime.trend.abs() * 20.0),
            volume_consistency: unit_clamp(regime.volume),
            liquidity: unit_clamp(regime.liquidity),
        }
    }

    /// Regime score in [0.1, 1].
    pub fn regime_score(&self) -> f64 {
        let score = 0.4 * self.normalized_volatility
            + 0.4 * self.trend_alignment
            + 0.2 * self.volume_consistency;
        if score.is_finite() { score.clamp(0.1, 1.0) } else { 0.1 }
    }

    fn weighted(&self) -> f64 {
        0.3 * self.normalized_volatility
            + 0.3 * self.trend_alignment
            + 0.2 * self.volume_consistency
            + 0.2 * self.liquidity
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAdjustment {
    pub confidence: f64,
    pub adjusted_confidence: f64,
    pub regime: MarketRegimeSnapshot,
    pub factors: RegimeFactors,
    pub regime_score: f64,
    pub volatility_spike: bool,
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn tail(candles: &[Candle], n: usize) -> &[Candle] {
    &candles[candles.len().saturating_sub(n)..]
}

fn simple_returns(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            if w[0].close > 0.0 {
                w[1].close / w[0].close - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

fn volume_consistency(volumes: &[f64]) -> f64 {
    let avg = mean(volumes);
    if avg <= 0.0 {
        return 1.0;
    }
    1.0 / (1.0 + population_stddev(volumes) / avg)
}

fn liquidity(window: &[Candle]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let spreads: Vec<f64> = window
        .iter()
        .map(|c| if c.close > 0.0 { (c.high - c.low) / c.close } else { 0.0 })
        .collect();
    let avg_volume = mean(&window.iter().map(|c| c.volume).collect::<Vec<_>>());
    1.0 / (1.0 + mean(&spreads) * 100.0) * (avg_volume / LIQUID_VOLUME).min(1.0)
}

/// Measure the regime of the trailing window.
pub fn measure_regime(candles: &[Candle]) -> MarketRegimeSnapshot {
    let window = tail(candles, REGIME_WINDOW);

    let trend = if candles.len() >= LONG_TREND_WINDOW {
        let short = mean(&tail(candles, REGIME_WINDOW).iter().map(|c| c.close).collect::<Vec<_>>());
        let long = mean(
            &tail(candles, LONG_TREND_WINDOW)
                .iter()
                .map(|c| c.close)
                .collect::<Vec<_>>(),
        );
        if long != 0.0 { (short - long) / long } else { 0.0 }
    } else {
        0.0
    };

    let volumes: Vec<f64> = window.iter().map(|c| c.volume).collect();

    MarketRegimeSnapshot {
        volatility: finite_or(population_stddev(&simple_returns(window)), 0.0),
        trend: finite_or(trend, 0.0),
        volume: finite_or(volume_consistency(&volumes), 1.0),
        liquidity: finite_or(liquidity(window), 0.0),
    }
}

/// Latest bar's true range against the ATR of the bars before it.
fn true_range_spike(candles: &[Candle]) -> bool {
    let n = candles.len();
    if n < 2 {
        return false;
    }
    let preceding = &candles[..n - 1];
    let latest_tr = candles[n - 1].true_range(preceding[n - 2].close);
    let prior_atr = latest_atr(preceding, atr::DEFAULT_PERIOD);
    if prior_atr > 0.0 {
        latest_tr > TRUE_RANGE_SPIKE_RATIO * prior_atr
    } else {
        latest_tr > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct RiskAdjuster {
    history: VecDeque<MarketRegimeSnapshot>,
    capacity: usize,
}

impl Default for RiskAdjuster {
    fn default() -> Self {
        RiskAdjuster::new()
    }
}

impl RiskAdjuster {
    pub fn new() -> Self {
        RiskAdjuster::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        RiskAdjuster {
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn history(&self) -> &VecDeque<MarketRegimeSnapshot> {
        &self.history
    }

    fn volatility_spike(&self, current: f64) -> bool {
        if self.history.is_empty() {
            return false;
        }
        let prior =
            self.history.iter().map(|s| s.volatility).sum::<f64>() / self.history.len() as f64;
        prior > 0.0 && current > VOLATILITY_SPIKE_RATIO * prior
    }

    fn record(&mut self, regime: MarketRegimeSnapshot) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(regime);
    }

    /// Rescale `confidence` by the regime of `candles` and record the regime.
    ///
    /// The result is in [0, 1]. During a volatility spike it never exceeds
    /// the input confidence.
    pub fn adjust(&mut self, confidence: f64, candles: &[Candle]) -> RiskAdjustment {
        let confidence = unit_clamp(confidence);
        let window = tail(candles, MAX_LOOKBACK);
        let regime = measure_regime(window);
        let factors = RegimeFactors::from_regime(&regime);
        let regime_score = factors.regime_score();

        let volatility_spike = self.volatility_spike(regime.volatility) || true_range_spike(window);

        let mut adjusted = unit_clamp(confidence * factors.weighted() * (0.5 + regime_score));
        if volatility_spike {
            adjusted = adjusted.min(confidence);
        }

        self.record(regime);

        RiskAdjustment {
            confidence,
            adjusted_confidence: adjusted,
            regime,
            factors,
            regime_score,
            volatility_spike,
        }
    }
}

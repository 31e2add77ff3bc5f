//! Stochastic oscillator.
//!
//! %K = (close - lowest_low) / (highest_high - lowest_low) * 100 over k_period bars,
//! 50 when the window has no range. %D = SMA(d_period) of %K.
//! Warmup: first (k_period + d_period - 2) bars are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::sma::sma_values;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;
const NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

impl Default for StochasticValue {
    fn default() -> Self {
        StochasticValue {
            k: NEUTRAL,
            d: NEUTRAL,
        }
    }
}

fn percent_k(window: &[Candle]) -> f64 {
    let highest = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let range = highest - lowest;
    match window.last() {
        Some(last) if range > 0.0 => ((last.close - lowest) / range * 100.0).clamp(0.0, 100.0),
        _ => NEUTRAL,
    }
}

fn warming_up() -> IndicatorValue {
    IndicatorValue::Stochastic {
        k: NEUTRAL,
        d: NEUTRAL,
    }
}

pub fn calculate_stochastic(
    candles: &[Candle],
    k_period: usize,
    d_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Stochastic { k_period, d_period };
    if k_period == 0 || d_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: candles
                .iter()
                .map(|c| point(c.timestamp, false, warming_up()))
                .collect(),
        };
    }

    let k_line: Vec<f64> = (0..candles.len())
        .filter(|&i| i + 1 >= k_period)
        .map(|i| percent_k(&candles[i + 1 - k_period..=i]))
        .collect();
    let d_line = sma_values(&k_line, d_period);

    let values = candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let reading = (i + 1)
                .checked_sub(k_period)
                .and_then(|j| Some((k_line[j], d_line[j]?)));
            match reading {
                Some((k, d)) => point(c.timestamp, true, IndicatorValue::Stochastic { k, d }),
                None => point(c.timestamp, false, warming_up()),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Latest 14/3 stochastic, both lines in [0, 100]; {50, 50} during warmup.
pub fn latest_stochastic(candles: &[Candle]) -> StochasticValue {
    match calculate_stochastic(candles, DEFAULT_K_PERIOD, DEFAULT_D_PERIOD).latest() {
        Some(IndicatorValue::Stochastic { k, d }) if k.is_finite() && d.is_finite() => {
            StochasticValue {
                k: k.clamp(0.0, 100.0),
                d: d.clamp(0.0, 100.0),
            }
        }
        _ => StochasticValue::default(),
    }
}

//! MACD (Moving Average Convergence Divergence) indicator, min-max normalized.
//!
//! Raw line = EMA(fast) - EMA(slow)
//! Line     = raw line rescaled to [-1, 1] against the min/max of the trailing
//!            `NORMALIZATION_WINDOW` raw values: 2*(x - min)/(max - min) - 1,
//!            or 0 when that window is flat
//! Signal   = EMA(signal) of the normalized line
//! Histogram = Line - Signal
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 bars

use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;
pub const NORMALIZATION_WINDOW: usize = 50;
const FLAT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

fn normalize(value: f64, window: &[f64]) -> f64 {
    let (min, max) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    // Rounding noise on a constant raw line must still count as flat.
    let scale = min.abs().max(max.abs());
    if range > scale * FLAT_TOLERANCE && range.is_finite() {
        (2.0 * (value - min) / range - 1.0).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

pub fn calculate_macd(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if candles.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let prices = closes(candles);
    let ema_fast = ema_values(&prices, fast);
    let ema_slow = ema_values(&prices, slow);

    // Raw line exists once both EMAs are out of warmup.
    let first_raw = fast.max(slow) - 1;
    let raw: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .filter_map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let normalized: Vec<f64> = (0..raw.len())
        .map(|j| {
            let start = (j + 1).saturating_sub(NORMALIZATION_WINDOW);
            normalize(raw[j], &raw[start..=j])
        })
        .collect();
    let signal = ema_values(&normalized, signal_period);

    let mut values = Vec::with_capacity(candles.len());
    for (i, candle) in candles.iter().enumerate() {
        let reading = i
            .checked_sub(first_raw)
            .and_then(|j| Some((normalized[j], signal.get(j).copied().flatten()?)));

        match reading {
            Some((line, signal)) => values.push(point(
                candle.timestamp,
                true,
                IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            )),
            None => values.push(point(
                candle.timestamp,
                false,
                IndicatorValue::Macd {
                    line: 0.0,
                    signal: 0.0,
                    histogram: 0.0,
                },
            )),
        }
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(candles: &[Candle]) -> IndicatorSeries {
    calculate_macd(candles, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// Latest normalized MACD with default parameters; all zeros during warmup.
pub fn latest_macd(candles: &[Candle]) -> MacdValue {
    match calculate_macd_default(candles).latest() {
        Some(IndicatorValue::Macd {
            line,
            signal,
            histogram,
        }) if histogram.is_finite() => MacdValue {
            line,
            signal,
            histogram,
        },
        _ => MacdValue::default(),
    }
}

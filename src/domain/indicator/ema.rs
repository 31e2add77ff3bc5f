//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are invalid.
//!
//! The update is written as `ema + k * (price - ema)`, which is algebraically
//! the same recursion but leaves a flat series exactly flat.

use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

/// SMA-seeded EMA over raw values; `None` during warmup.
pub(crate) fn ema_values(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &price) in values.iter().enumerate() {
        if i < period - 1 {
            sum += price;
            out.push(None);
        } else if i == period - 1 {
            sum += price;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema += k * (price - ema);
            out.push(Some(ema));
        }
    }
    out
}

pub fn calculate_ema(candles: &[Candle], period: usize) -> IndicatorSeries {
    let values = ema_values(&closes(candles), period)
        .into_iter()
        .zip(candles)
        .map(|(v, c)| point(c.timestamp, v.is_some(), IndicatorValue::Simple(v.unwrap_or(0.0))))
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// Latest EMA, falling back to the last close (0.0 for an empty series).
pub fn latest_ema(candles: &[Candle], period: usize) -> f64 {
    calculate_ema(candles, period)
        .latest_simple()
        .unwrap_or_else(|| candles.last().map(|c| c.close).unwrap_or(0.0))
}

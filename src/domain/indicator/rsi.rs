//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n bars
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes to compute initial average).

use crate::domain::candle::Candle;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_PERIOD: usize = 14;
/// Returned when there is not enough history.
pub const DEFAULT_RSI: f64 = 50.0;

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());

    if period == 0 || candles.len() < 2 {
        values.extend(
            candles
                .iter()
                .map(|c| point(c.timestamp, false, IndicatorValue::Simple(0.0))),
        );
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    values.push(point(candles[0].timestamp, false, IndicatorValue::Simple(0.0)));

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, pair) in candles.windows(2).enumerate() {
        let change = pair[1].close - pair[0].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i < period - 1 {
            gain_sum += gain;
            loss_sum += loss;
            values.push(point(pair[1].timestamp, false, IndicatorValue::Simple(0.0)));
            continue;
        }

        if i == period - 1 {
            avg_gain = (gain_sum + gain) / period as f64;
            avg_loss = (loss_sum + loss) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        let rsi = rsi_from_averages(avg_gain, avg_loss);
        values.push(point(pair[1].timestamp, true, IndicatorValue::Simple(rsi)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

/// Latest RSI in [0, 100]; [`DEFAULT_RSI`] during warmup.
pub fn latest_rsi(candles: &[Candle], period: usize) -> f64 {
    calculate_rsi(candles, period)
        .latest_simple()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
        .unwrap_or(DEFAULT_RSI)
}

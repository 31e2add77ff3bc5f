//! OBV (On-Balance Volume) indicator implementation.

use crate::domain::candle::Candle;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

/// Calculate OBV (On-Balance Volume) over the given window.
///
/// OBV[0] = 0 (the first bar has no close-to-close direction)
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; all bars are valid.
pub fn calculate_obv(candles: &[Candle]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let mut obv = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i > 0 {
            let prev_close = candles[i - 1].close;
            if candle.close > prev_close {
                obv += candle.volume;
            } else if candle.close < prev_close {
                obv -= candle.volume;
            }
        }
        values.push(point(candle.timestamp, true, IndicatorValue::Simple(obv)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Obv,
        values,
    }
}

/// Latest OBV; 0.0 for an empty window.
pub fn latest_obv(candles: &[Candle]) -> f64 {
    calculate_obv(candles)
        .latest_simple()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

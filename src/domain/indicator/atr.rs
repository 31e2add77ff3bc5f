//! Average True Range with Wilder smoothing.
//!
//! TR[0] = high - low, TR[i] = true_range(prev_close).
//! Seed: mean of the first n true ranges, then ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_PERIOD: usize = 14;

pub(crate) fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.high - c.low
            } else {
                c.true_range(candles[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(candles: &[Candle], period: usize) -> IndicatorSeries {
    let tr = true_ranges(candles);
    let mut values = Vec::with_capacity(candles.len());
    let mut atr = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if period == 0 || i + 1 < period {
            values.push(point(candle.timestamp, false, IndicatorValue::Simple(0.0)));
            continue;
        }
        if i + 1 == period {
            atr = tr[..=i].iter().sum::<f64>() / period as f64;
        } else {
            atr = (atr * (period - 1) as f64 + tr[i]) / period as f64;
        }
        values.push(point(candle.timestamp, true, IndicatorValue::Simple(atr)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

/// Latest ATR; 0.0 during warmup.
pub fn latest_atr(candles: &[Candle], period: usize) -> f64 {
    calculate_atr(candles, period)
        .latest_simple()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::bar;

    #[test]
    fn atr_warmup() {
        let candles: Vec<Candle> = (0..5).map(|i| bar(i, 110.0, 90.0, 100.0, 1000.0)).collect();
        let series = calculate_atr(&candles, 3);

        assert_eq!(series.values.len(), 5);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn atr_seed_is_average() {
        let candles = vec![
            bar(0, 110.0, 100.0, 105.0, 1000.0),
            bar(1, 115.0, 105.0, 110.0, 1000.0),
            bar(2, 120.0, 110.0, 115.0, 1000.0),
        ];
        assert!((latest_atr(&candles, 3) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let candles = vec![
            bar(0, 110.0, 100.0, 105.0, 1000.0),
            bar(1, 115.0, 105.0, 110.0, 1000.0),
            bar(2, 120.0, 110.0, 115.0, 1000.0),
            bar(3, 135.0, 115.0, 120.0, 1000.0),
        ];
        // seed 10, then TR 20
        let expected = (10.0 * 2.0 + 20.0) / 3.0;
        assert!((latest_atr(&candles, 3) - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_handles_gaps() {
        let candles = vec![
            bar(0, 110.0, 100.0, 105.0, 1000.0),
            bar(1, 130.0, 120.0, 125.0, 1000.0),
        ];
        // TR[1] = |130 - 105| = 25, seed over two bars = (10 + 25) / 2
        assert!((latest_atr(&candles, 2) - 17.5).abs() < 1e-9);
    }

    #[test]
    fn atr_default_when_short() {
        let candles: Vec<Candle> = (0..2).map(|i| bar(i, 110.0, 90.0, 100.0, 1000.0)).collect();
        assert_eq!(latest_atr(&candles, 5), 0.0);
        assert_eq!(latest_atr(&[], 14), 0.0);
    }
}

//! Volume-Weighted Average Price, cumulative from the start of the window.
//!
//! VWAP[i] = Σ(typical_price * volume) / Σ volume over bars 0..=i.
//! While no volume has traded the last typical price stands in.

use crate::domain::candle::Candle;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_vwap(candles: &[Candle]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let mut pv_sum = 0.0;
    let mut volume_sum = 0.0;

    for candle in candles {
        let typical = candle.typical_price();
        pv_sum += typical * candle.volume;
        volume_sum += candle.volume;
        let vwap = if volume_sum > 0.0 {
            pv_sum / volume_sum
        } else {
            typical
        };
        values.push(point(candle.timestamp, true, IndicatorValue::Simple(vwap)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Vwap,
        values,
    }
}

/// Latest VWAP; 0.0 for an empty window.
pub fn latest_vwap(candles: &[Candle]) -> f64 {
    calculate_vwap(candles)
        .latest_simple()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::bar;

    #[test]
    fn vwap_weights_by_volume() {
        let candles = vec![
            bar(0, 10.0, 10.0, 10.0, 100.0),
            bar(1, 20.0, 20.0, 20.0, 300.0),
        ];
        // (10*100 + 20*300) / 400
        assert!((latest_vwap(&candles) - 17.5).abs() < 1e-12);
    }

    #[test]
    fn vwap_uses_typical_price() {
        let candles = vec![bar(0, 12.0, 6.0, 9.0, 50.0)];
        assert!((latest_vwap(&candles) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn vwap_zero_volume_falls_back_to_typical() {
        let candles = vec![bar(0, 11.0, 9.0, 10.0, 0.0), bar(1, 13.0, 11.0, 12.0, 0.0)];
        assert!((latest_vwap(&candles) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn vwap_empty_is_zero() {
        assert_eq!(latest_vwap(&[]), 0.0);
    }
}

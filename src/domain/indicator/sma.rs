//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

/// Rolling mean over raw values; `None` during warmup.
pub(crate) fn sma_values(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        out.push((i + 1 >= period).then(|| sum / period as f64));
    }
    out
}

pub fn calculate_sma(candles: &[Candle], period: usize) -> IndicatorSeries {
    let values = sma_values(&closes(candles), period)
        .into_iter()
        .zip(candles)
        .map(|(v, c)| point(c.timestamp, v.is_some(), IndicatorValue::Simple(v.unwrap_or(0.0))))
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

/// Latest SMA, falling back to the last close (0.0 for an empty series).
pub fn latest_sma(candles: &[Candle], period: usize) -> f64 {
    calculate_sma(candles, period)
        .latest_simple()
        .unwrap_or_else(|| candles.last().map(|c| c.close).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    #[test]
    fn sma_warmup_and_values() {
        let candles = from_closes(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&candles, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert_eq!(series.values[2].value, IndicatorValue::Simple(20.0));
        assert_eq!(series.values[3].value, IndicatorValue::Simple(30.0));
    }

    #[test]
    fn sma_zero_period_all_invalid() {
        let candles = from_closes(&[10.0, 20.0]);
        let series = calculate_sma(&candles, 0);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn latest_sma_defaults_to_last_close() {
        let candles = from_closes(&[10.0, 20.0]);
        assert_eq!(latest_sma(&candles, 5), 20.0);
        assert_eq!(latest_sma(&[], 5), 0.0);
    }
}

//! Historical volatility.
//!
//! Population standard deviation of the last n log returns ln(C[i]/C[i-1]),
//! annualized by sqrt(252). A return whose prices are not both positive counts
//! as 0. Warmup: first n bars are invalid (n returns are needed).

use crate::domain::candle::Candle;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::stats::population_stddev;

pub const DEFAULT_PERIOD: usize = 20;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub(crate) fn log_returns(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            if w[0].close > 0.0 && w[1].close > 0.0 {
                (w[1].close / w[0].close).ln()
            } else {
                0.0
            }
        })
        .collect()
}

pub fn calculate_historical_volatility(candles: &[Candle], period: usize) -> IndicatorSeries {
    let returns = log_returns(candles);
    let annualizer = TRADING_DAYS_PER_YEAR.sqrt();

    let values = candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            // returns[i - 1] is the move into bar i
            if period > 0 && i >= period {
                let window = &returns[i - period..i];
                let hv = population_stddev(window) * annualizer;
                point(c.timestamp, true, IndicatorValue::Simple(hv))
            } else {
                point(c.timestamp, false, IndicatorValue::Simple(0.0))
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::HistoricalVolatility(period),
        values,
    }
}

/// Latest annualized volatility; 0.0 during warmup.
pub fn latest_historical_volatility(candles: &[Candle], period: usize) -> f64 {
    calculate_historical_volatility(candles, period)
        .latest_simple()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    #[test]
    fn hv_constant_prices_is_zero() {
        assert_eq!(latest_historical_volatility(&from_closes(&[50.0; 30]), 20), 0.0);
    }

    #[test]
    fn hv_constant_growth_is_zero() {
        // Identical log returns have no dispersion.
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        assert!(latest_historical_volatility(&from_closes(&closes), 20) < 1e-9);
    }

    #[test]
    fn hv_alternating_returns() {
        // Returns alternate between +r and -r, so stdev is r.
        let closes: Vec<f64> = (0..21).map(|i| if i % 2 == 0 { 100.0 } else { 110.0 }).collect();
        let r = (110.0_f64 / 100.0).ln();
        let expected = r * TRADING_DAYS_PER_YEAR.sqrt();
        let hv = latest_historical_volatility(&from_closes(&closes), 20);
        assert!((hv - expected).abs() < 1e-9);
    }

    #[test]
    fn hv_warmup() {
        let series = calculate_historical_volatility(&from_closes(&[1.0; 25]), 20);
        assert!(!series.values[19].valid);
        assert!(series.values[20].valid);
    }

    #[test]
    fn hv_non_positive_prices_do_not_poison() {
        let mut closes = vec![100.0; 25];
        closes[10] = 0.0;
        let hv = latest_historical_volatility(&from_closes(&closes), 20);
        assert!(hv.is_finite());
    }
}

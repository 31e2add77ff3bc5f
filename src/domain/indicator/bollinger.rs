//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - Bandwidth: (multiplier × StdDev) / Middle, 0 when Middle is 0
//!
//! StdDev is population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::stats::{mean, population_stddev};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub bandwidth: f64,
}

impl BollingerValue {
    fn collapsed(price: f64) -> Self {
        BollingerValue {
            upper: price,
            middle: price,
            lower: price,
            bandwidth: 0.0,
        }
    }
}

pub fn calculate_bollinger(
    candles: &[Candle],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let mult = stddev_mult_x100 as f64 / 100.0;

    for (i, candle) in candles.iter().enumerate() {
        let valid = period > 0 && i + 1 >= period;

        let band = if valid {
            let window: Vec<f64> = candles[i + 1 - period..=i].iter().map(|c| c.close).collect();
            let middle = mean(&window);
            let width = mult * population_stddev(&window);
            BollingerValue {
                upper: middle + width,
                middle,
                lower: middle - width,
                bandwidth: if middle != 0.0 { width / middle } else { 0.0 },
            }
        } else {
            BollingerValue::default()
        };

        values.push(point(
            candle.timestamp,
            valid,
            IndicatorValue::Bollinger {
                upper: band.upper,
                middle: band.middle,
                lower: band.lower,
                bandwidth: band.bandwidth,
            },
        ));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}

/// Latest 20/2σ bands; collapsed onto the last close during warmup.
pub fn latest_bollinger(candles: &[Candle]) -> BollingerValue {
    match calculate_bollinger(candles, DEFAULT_PERIOD, DEFAULT_MULT_X100).latest() {
        Some(IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
            bandwidth,
        }) => BollingerValue {
            upper,
            middle,
            lower,
            bandwidth,
        },
        _ => BollingerValue::collapsed(candles.last().map(|c| c.close).unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    fn band_at(series: &IndicatorSeries, i: usize) -> (f64, f64, f64, f64) {
        match series.values[i].value {
            IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
                bandwidth,
            } => (upper, middle, lower, bandwidth),
            _ => panic!("Expected Bollinger value"),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let series = calculate_bollinger(&from_closes(&[10.0, 20.0, 30.0, 40.0]), 3, 200);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn bollinger_constant_values() {
        let series = calculate_bollinger(&from_closes(&[100.0; 5]), 3, 200);
        let (upper, middle, lower, bandwidth) = band_at(&series, 2);
        assert_eq!((upper, middle, lower, bandwidth), (100.0, 100.0, 100.0, 0.0));
    }

    #[test]
    fn bollinger_basic_calculation() {
        let series = calculate_bollinger(&from_closes(&[10.0, 20.0, 30.0]), 3, 200);
        let (upper, middle, lower, bandwidth) = band_at(&series, 2);

        let stddev = (200.0_f64 / 3.0).sqrt();
        assert!((middle - 20.0).abs() < 1e-10);
        assert!((upper - (20.0 + 2.0 * stddev)).abs() < 1e-10);
        assert!((lower - (20.0 - 2.0 * stddev)).abs() < 1e-10);
        assert!((bandwidth - 2.0 * stddev / 20.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let series = calculate_bollinger(&from_closes(&[10.0, 25.0, 30.0]), 3, 150);
        let (upper, middle, lower, _) = band_at(&series, 2);
        assert!(((upper - middle) - (middle - lower)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_zero_middle_has_zero_bandwidth() {
        let series = calculate_bollinger(&from_closes(&[-1.0, 1.0]), 2, 200);
        let (_, middle, _, bandwidth) = band_at(&series, 1);
        assert_eq!(middle, 0.0);
        assert_eq!(bandwidth, 0.0);
    }

    #[test]
    fn latest_bollinger_default_collapses_on_close() {
        let band = latest_bollinger(&from_closes(&[50.0, 51.0]));
        assert_eq!(band, BollingerValue::collapsed(51.0));
    }
}

//! Technical indicator implementations.
//!
//! Every indicator has a full-series calculator returning an
//! [`IndicatorSeries`] whose warmup points are flagged invalid, and a
//! `latest_*` accessor that returns the indicator's documented default when
//! the series is too short. The accessors never panic and never return NaN.
//!
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod stochastic;
pub mod trend;
pub mod volatility;
pub mod vwap;

pub use adx::{calculate_adx, latest_adx};
pub use atr::{calculate_atr, latest_atr};
pub use bollinger::{calculate_bollinger, latest_bollinger};
pub use ema::{calculate_ema, latest_ema};
pub use macd::{calculate_macd, latest_macd};
pub use obv::{calculate_obv, latest_obv};
pub use rsi::{calculate_rsi, latest_rsi};
pub use sma::{calculate_sma, latest_sma};
pub use snapshot::IndicatorSnapshot;
pub use stochastic::{calculate_stochastic, latest_stochastic};
pub use trend::{latest_volume_trend, trend_strength, volume_trend};
pub use volatility::{calculate_historical_volatility, latest_historical_volatility};
pub use vwap::{calculate_vwap, latest_vwap};

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Stochastic {
        k: f64,
        d: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
        bandwidth: f64,
    },
}

impl IndicatorValue {
    pub fn as_simple(&self) -> Option<f64> {
        match self {
            IndicatorValue::Simple(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Adx(usize),
    HistoricalVolatility(usize),
    Obv,
    Vwap,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The final point's value, if that point is out of warmup.
    pub fn latest(&self) -> Option<IndicatorValue> {
        self.values.last().filter(|p| p.valid).map(|p| p.value)
    }

    pub fn latest_simple(&self) -> Option<f64> {
        self.latest().and_then(|v| v.as_simple())
    }

    /// Simple values of every valid point, in order.
    pub fn valid_simple_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter(|p| p.valid)
            .filter_map(|p| p.value.as_simple())
            .collect()
    }
}

/// Helper for calculators that emit one point per candle.
pub(crate) fn point(
    timestamp: NaiveDateTime,
    valid: bool,
    value: IndicatorValue,
) -> IndicatorPoint {
    IndicatorPoint {
        timestamp,
        valid,
        value,
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::HistoricalVolatility(period) => write!(f, "HV({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::Vwap => write!(f, "VWAP"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_bars {
    use crate::domain::candle::Candle;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    pub fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(i as i64)
    }

    /// Candles whose OHLC all equal the close.
    pub fn from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: ts(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    pub fn bar(i: usize, high: f64, low: f64, close: f64, volume: f64) -> Candle {
        Candle {
            timestamp: ts(i),
            open: close,
            high,
            low,
            close,
            volume,
        }
    }
}

//! Per-bar bundle of every indicator the signal composer consumes.

use chrono::NaiveDateTime;

use crate::domain::candle::Candle;
use crate::domain::indicator::bollinger::BollingerValue;
use crate::domain::indicator::macd::MacdValue;
use crate::domain::indicator::stochastic::StochasticValue;
use crate::domain::indicator::trend::{
    latest_volume_trend, trend_strength, FAST_EMA_PERIOD, SLOW_EMA_PERIOD,
};
use crate::domain::indicator::{
    adx, atr, latest_adx, latest_atr, latest_bollinger, latest_ema, latest_historical_volatility,
    latest_macd, latest_obv, latest_rsi, latest_stochastic, latest_vwap, rsi, volatility,
};

/// Longest trailing window any snapshot computation looks at.
pub const MAX_LOOKBACK: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    /// Timestamp of the bar the snapshot describes; `None` for an empty series.
    pub timestamp: Option<NaiveDateTime>,
    pub rsi: f64,
    pub macd: MacdValue,
    pub bollinger: BollingerValue,
    pub atr: f64,
    pub adx: f64,
    pub stochastic: StochasticValue,
    pub vwap: f64,
    pub obv: f64,
    pub volume_trend: f64,
    pub historical_volatility: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub trend_strength: f64,
}

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        IndicatorSnapshot {
            timestamp: None,
            rsi: rsi::DEFAULT_RSI,
            macd: MacdValue::default(),
            bollinger: BollingerValue::default(),
            atr: 0.0,
            adx: 0.0,
            stochastic: StochasticValue::default(),
            vwap: 0.0,
            obv: 0.0,
            volume_trend: 1.0,
            historical_volatility: 0.0,
            ema_fast: 0.0,
            ema_slow: 0.0,
            trend_strength: 0.0,
        }
    }
}

impl IndicatorSnapshot {
    /// Compute the snapshot for the last candle of `candles`.
    ///
    /// Only the trailing [`MAX_LOOKBACK`] bars are read. Series shorter than
    /// two bars yield the defaults, with bands and averages collapsed onto the
    /// single close when there is one.
    pub fn compute(candles: &[Candle]) -> Self {
        let window = &candles[candles.len().saturating_sub(MAX_LOOKBACK)..];
        let Some(last) = window.last() else {
            return IndicatorSnapshot::default();
        };
        if window.len() < 2 {
            return IndicatorSnapshot {
                timestamp: Some(last.timestamp),
                bollinger: latest_bollinger(window),
                vwap: latest_vwap(window),
                ema_fast: last.close,
                ema_slow: last.close,
                ..IndicatorSnapshot::default()
            };
        }

        let ema_fast = latest_ema(window, FAST_EMA_PERIOD);
        let ema_slow = latest_ema(window, SLOW_EMA_PERIOD);
        let atr = latest_atr(window, atr::DEFAULT_PERIOD);

        IndicatorSnapshot {
            timestamp: Some(last.timestamp),
            rsi: latest_rsi(window, rsi::DEFAULT_PERIOD),
            macd: latest_macd(window),
            bollinger: latest_bollinger(window),
            atr,
            adx: latest_adx(window, adx::DEFAULT_PERIOD),
            stochastic: latest_stochastic(window),
            vwap: latest_vwap(window),
            obv: latest_obv(window),
            volume_trend: latest_volume_trend(window),
            historical_volatility: latest_historical_volatility(window, volatility::DEFAULT_PERIOD),
            ema_fast,
            ema_slow,
            trend_strength: trend_strength(ema_fast, ema_slow, atr),
        }
    }

    /// Every field is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.rsi,
            self.macd.line,
            self.macd.signal,
            self.macd.histogram,
            self.bollinger.upper,
            self.bollinger.middle,
            self.bollinger.lower,
            self.bollinger.bandwidth,
            self.atr,
            self.adx,
            self.stochastic.k,
            self.stochastic.d,
            self.vwap,
            self.obv,
            self.volume_trend,
            self.historical_volatility,
            self.ema_fast,
            self.ema_slow,
            self.trend_strength,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

//! Derived trend measures used by the signal composer.

use crate::domain::candle::Candle;
use crate::domain::stats::mean;

pub const FAST_EMA_PERIOD: usize = 9;
pub const SLOW_EMA_PERIOD: usize = 21;
pub const SHORT_VOLUME_WINDOW: usize = 5;
pub const LONG_VOLUME_WINDOW: usize = 20;

/// Distance between the fast and slow EMA measured in ATRs.
///
/// 0.0 when the ATR is zero or any input is non-finite.
pub fn trend_strength(ema_fast: f64, ema_slow: f64, atr: f64) -> f64 {
    if atr <= 0.0 || !atr.is_finite() || !ema_fast.is_finite() || !ema_slow.is_finite() {
        return 0.0;
    }
    (ema_fast - ema_slow).abs() / atr
}

/// Mean volume of the last `short` bars over the mean of the last `long` bars.
///
/// 1.0 (neutral) until `long` bars exist or when the long mean is zero.
pub fn volume_trend(candles: &[Candle], short: usize, long: usize) -> f64 {
    if short == 0 || long == 0 || candles.len() < long.max(short) {
        return 1.0;
    }
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    let long_mean = mean(&volumes[volumes.len() - long..]);
    if long_mean <= 0.0 {
        return 1.0;
    }
    let ratio = mean(&volumes[volumes.len() - short..]) / long_mean;
    if ratio.is_finite() { ratio } else { 1.0 }
}

/// Volume trend over the standard 5/20 windows.
pub fn latest_volume_trend(candles: &[Candle]) -> f64 {
    volume_trend(candles, SHORT_VOLUME_WINDOW, LONG_VOLUME_WINDOW)
}

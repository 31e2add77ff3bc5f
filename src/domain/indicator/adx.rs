//! Average Directional Index.
//!
//! For each bar after the first:
//!   up = high - prev_high, down = prev_low - low
//!   +DM = up if up > down and up > 0, else 0
//!   -DM = down if down > up and down > 0, else 0
//! TR, +DM and -DM are Wilder-smoothed over n bars (seeded with their mean).
//!   ±DI = 100 * smoothed ±DM / smoothed TR   (0 when smoothed TR is 0)
//!   DX  = |+DI - -DI| / (+DI + -DI) * 100   (0 when the DI sum is 0)
//! ADX is the Wilder average of DX, seeded with the mean of the first n DX values.
//! Warmup: first (2n - 1) bars are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::atr::true_ranges;
use crate::domain::indicator::{point, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_PERIOD: usize = 14;

fn wilder(prev: f64, current: f64, period: usize) -> f64 {
    (prev * (period - 1) as f64 + current) / period as f64
}

fn dx(plus_dm: f64, minus_dm: f64, tr: f64) -> f64 {
    if tr <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_dm / tr;
    let minus_di = 100.0 * minus_dm / tr;
    let sum = plus_di + minus_di;
    if sum <= 0.0 {
        0.0
    } else {
        (plus_di - minus_di).abs() / sum * 100.0
    }
}

pub fn calculate_adx(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values: Vec<_> = candles
        .iter()
        .map(|c| point(c.timestamp, false, IndicatorValue::Simple(0.0)))
        .collect();

    if period == 0 || candles.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Adx(period),
            values,
        };
    }

    let tr = true_ranges(candles);
    let (mut s_tr, mut s_plus, mut s_minus) = (0.0, 0.0, 0.0);
    let mut dx_seed = 0.0;
    let mut adx = 0.0;

    for i in 1..candles.len() {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };

        // i counts directional movements observed so far
        if i < period {
            s_tr += tr[i];
            s_plus += plus_dm;
            s_minus += minus_dm;
            continue;
        }
        if i == period {
            s_tr = (s_tr + tr[i]) / period as f64;
            s_plus = (s_plus + plus_dm) / period as f64;
            s_minus = (s_minus + minus_dm) / period as f64;
        } else {
            s_tr = wilder(s_tr, tr[i], period);
            s_plus = wilder(s_plus, plus_dm, period);
            s_minus = wilder(s_minus, minus_dm, period);
        }

        let current_dx = dx(s_plus, s_minus, s_tr);
        let dx_count = i - period + 1;
        if dx_count < period {
            dx_seed += current_dx;
        } else {
            adx = if dx_count == period {
                (dx_seed + current_dx) / period as f64
            } else {
                wilder(adx, current_dx, period)
            };
            values[i] = point(candles[i].timestamp, true, IndicatorValue::Simple(adx));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    }
}

/// Latest ADX in [0, 100]; 0.0 during warmup.
pub fn latest_adx(candles: &[Candle], period: usize) -> f64 {
    calculate_adx(candles, period)
        .latest_simple()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

//! Market scenarios run end to end through indicators, signal and risk.

mod common;

use approx::assert_relative_eq;
use common::*;
use sigbench::domain::indicator::{calculate_adx, IndicatorSnapshot};
use sigbench::domain::risk::RiskAdjuster;
use sigbench::domain::signal::{compose_signal, Direction};

#[test]
fn monotonic_uptrend_is_confident_long() {
    let candles = monotonic(60);
    let snapshot = IndicatorSnapshot::compute(&candles);
    let signal = compose_signal(&snapshot);

    assert_eq!(signal.direction, Direction::Long);
    assert!(signal.confidence > 0.6, "confidence {}", signal.confidence);
    assert!(snapshot.ema_fast > snapshot.ema_slow);
    assert!(snapshot.rsi > 70.0);
}

#[test]
fn flat_market_has_no_trend() {
    let candles = flat(30);
    let snapshot = IndicatorSnapshot::compute(&candles);
    let signal = compose_signal(&snapshot);

    assert_eq!(snapshot.trend_strength, 0.0);
    assert_eq!(snapshot.atr, 0.0);
    assert_relative_eq!(snapshot.bollinger.upper, 100.0);
    assert_relative_eq!(snapshot.bollinger.lower, 100.0);
    assert_eq!(signal.direction, Direction::Neutral);
}

#[test]
fn price_shock_reads_oversold_and_cuts_confidence() {
    let candles = shock();
    let snapshot = IndicatorSnapshot::compute(&candles);
    assert!(snapshot.rsi < 30.0, "rsi {}", snapshot.rsi);

    let adx = calculate_adx(&candles, 14);
    let n = candles.len();
    let before = adx.values[n - 2].value.as_simple().unwrap();
    let after = adx.values[n - 1].value.as_simple().unwrap();
    assert!(after > before, "adx {} -> {}", before, after);

    let signal = compose_signal(&snapshot);
    assert!(signal.confidence > 0.0);
    let mut adjuster = RiskAdjuster::new();
    let adjustment = adjuster.adjust(signal.confidence, &candles);
    assert!(adjustment.volatility_spike);
    assert!(adjustment.adjusted_confidence < signal.confidence);
}

#[test]
fn snapshot_ignores_bars_beyond_lookback() {
    let mut long = flat(50);
    long.extend(wavy(200).into_iter().skip(50));
    let tail_only = long[long.len() - 100..].to_vec();
    assert_eq!(IndicatorSnapshot::compute(&long), IndicatorSnapshot::compute(&tail_only));
}

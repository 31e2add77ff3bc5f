//! Walk-forward strategy loop shared by the backtest and the empirical
//! Monte Carlo paths.
//!
//! From `warmup_bars` onward every bar is scored and risk-adjusted, so the
//! adjuster's regime history sees each bar exactly once. A bar is traded when
//! its signal has a direction, its ATR is positive and its adjusted confidence
//! reaches the strategy minimum. A filled trade resumes the walk on its exit
//! bar; a rejected proposal moves on to the next bar.

use rand::Rng;

use crate::domain::candle::Candle;
use crate::domain::config::StrategyParams;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::risk::RiskAdjuster;
use crate::domain::signal::{compose_signal, Direction};
use crate::domain::simulator::{SimulatedTrade, TradeRequest};

/// Stop and target distance plus position size for a signal at `entry`.
pub fn build_request(
    direction: Direction,
    confidence: f64,
    entry: f64,
    atr: f64,
    balance: f64,
    strategy: &StrategyParams,
) -> TradeRequest {
    let sign = direction.sign();
    let stop_distance = strategy.stop_atr_mult * atr;
    TradeRequest {
        direction,
        entry_price: entry,
        stop_loss: entry - sign * stop_distance,
        take_profit: entry + sign * strategy.target_atr_mult * atr,
        size: balance * strategy.risk_fraction / stop_distance,
        confidence,
    }
}

/// Walk `series` with `strategy`, resolving each proposal through `simulate`.
///
/// `on_outcome` receives the entry bar, the simulator's answer and the
/// balance after it. The walk stops once the balance is no longer positive
/// and finite. Returns the final balance.
pub fn walk_forward<R, S, F>(
    series: &[Candle],
    strategy: &StrategyParams,
    initial_balance: f64,
    rng: &mut R,
    mut simulate: S,
    mut on_outcome: F,
) -> f64
where
    R: Rng + ?Sized,
    S: FnMut(&TradeRequest, &[Candle], &mut R) -> Option<SimulatedTrade>,
    F: FnMut(usize, Option<&SimulatedTrade>, f64),
{
    let mut adjuster = RiskAdjuster::new();
    let mut balance = initial_balance;

    let mut i = strategy.warmup_bars;
    while i + 1 < series.len() && balance > 0.0 && balance.is_finite() {
        let window = &series[..=i];
        let snapshot = IndicatorSnapshot::compute(window);
        let signal = compose_signal(&snapshot);
        let adjustment = adjuster.adjust(signal.confidence, window);
        if signal.direction == Direction::Neutral
            || snapshot.atr <= 0.0
            || adjustment.adjusted_confidence < strategy.min_confidence
        {
            i += 1;
            continue;
        }

        let request = build_request(
            signal.direction,
            adjustment.adjusted_confidence,
            series[i].close,
            snapshot.atr,
            balance,
            strategy,
        );
        let end = (i + 1 + strategy.max_holding_bars).min(series.len());
        match simulate(&request, &series[i + 1..end], rng) {
            Some(trade) => {
                balance += trade.pnl;
                on_outcome(i, Some(&trade), balance);
                i += trade.bars_held;
            }
            None => {
                on_outcome(i, None, balance);
                i += 1;
            }
        }
    }

    balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;
    use crate::domain::simulator::simulate_trade;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rising(n: usize) -> Vec<Candle> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        from_closes(&closes)
    }

    fn loose_strategy() -> StrategyParams {
        StrategyParams::builder()
            .min_confidence(0.0)
            .warmup_bars(60)
            .max_holding_bars(8)
            .build()
            .unwrap()
    }

    #[test]
    fn request_levels_follow_direction() {
        let strategy = StrategyParams::builder().build().unwrap();
        let long = build_request(Direction::Long, 0.5, 100.0, 2.0, 10_000.0, &strategy);
        assert_eq!(long.stop_loss, 96.0);
        assert_eq!(long.take_profit, 106.0);
        // 1% of 10k at risk over a 4-point stop
        assert!((long.size - 25.0).abs() < 1e-12);
        let short = build_request(Direction::Short, 0.5, 100.0, 2.0, 10_000.0, &strategy);
        assert_eq!(short.stop_loss, 104.0);
        assert_eq!(short.take_profit, 94.0);
    }

    #[test]
    fn flat_series_never_proposes() {
        let series = from_closes(&[100.0; 80]);
        let strategy = loose_strategy();
        let mut calls = 0;
        let balance = walk_forward(
            &series,
            &strategy,
            1_000.0,
            &mut StdRng::seed_from_u64(1),
            |request, path, rng| {
                calls += 1;
                simulate_trade(request, path, rng)
            },
            |_, _, _| {},
        );
        assert_eq!(calls, 0);
        assert_eq!(balance, 1_000.0);
    }

    #[test]
    fn filled_trades_resume_on_exit_bar() {
        let series = rising(120);
        let strategy = loose_strategy();
        let mut entries = Vec::new();
        let mut pnl = 0.0;
        let balance = walk_forward(
            &series,
            &strategy,
            10_000.0,
            &mut StdRng::seed_from_u64(3),
            |request, path, rng| simulate_trade(request, path, rng),
            |entry, outcome, _| {
                let trade = outcome.unwrap();
                pnl += trade.pnl;
                entries.push((entry, trade.bars_held));
            },
        );

        // a steady climb of one ATR per bar reaches the 3 ATR target on the third bar
        assert!(!entries.is_empty());
        assert!(entries[0].0 >= strategy.warmup_bars);
        assert!(entries.iter().all(|&(_, held)| held == 3));
        for pair in entries.windows(2) {
            let (entry, held) = pair[0];
            assert!(held <= strategy.max_holding_bars);
            assert!(pair[1].0 >= entry + held);
        }
        assert!((balance - (10_000.0 + pnl)).abs() < 1e-6);
    }

    #[test]
    fn rejections_advance_one_bar() {
        let series = rising(100);
        let strategy = loose_strategy();
        let mut entries = Vec::new();
        walk_forward(
            &series,
            &strategy,
            10_000.0,
            &mut StdRng::seed_from_u64(3),
            |_, _, _| None,
            |entry, outcome, balance| {
                assert!(outcome.is_none());
                assert_eq!(balance, 10_000.0);
                entries.push(entry);
            },
        );
        assert!(!entries.is_empty());
        assert!(entries.windows(2).all(|w| w[1] > w[0]));
    }
}

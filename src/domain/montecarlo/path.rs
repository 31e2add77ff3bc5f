//! Simulation of a single Monte Carlo path.

use rand::Rng;

use crate::domain::candle::Candle;
use crate::domain::config::{EmpiricalParams, ParametricParams};
use crate::domain::metrics::{max_drawdown, returns, sharpe};
use crate::domain::montecarlo::bootstrap::block_bootstrap;
use crate::domain::simulator::TradeSimulator;
use crate::domain::walk_forward::walk_forward;

/// Outcome of one simulated path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub index: usize,
    pub final_balance: f64,
    pub equity_curve: Vec<f64>,
    pub max_drawdown: f64,
    pub sharpe: f64,
    pub trades: usize,
    pub wins: usize,
    pub max_consecutive_losses: usize,
    /// The balance left the finite range; the path is excluded from statistics.
    pub failed: bool,
}

/// Running tally of trade outcomes along a path.
#[derive(Debug, Default)]
struct Tally {
    trades: usize,
    wins: usize,
    losing_streak: usize,
    max_losing_streak: usize,
}

impl Tally {
    fn record(&mut self, won: bool) {
        self.trades += 1;
        if won {
            self.wins += 1;
            self.losing_streak = 0;
        } else {
            self.losing_streak += 1;
            self.max_losing_streak = self.max_losing_streak.max(self.losing_streak);
        }
    }
}

fn finish(index: usize, equity_curve: Vec<f64>, tally: Tally, risk_free_rate: f64) -> PathResult {
    let final_balance = equity_curve.last().copied().unwrap_or(0.0);
    let failed = equity_curve.iter().any(|v| !v.is_finite());
    let (max_dd, path_sharpe) = if failed {
        (0.0, 0.0)
    } else {
        (max_drawdown(&equity_curve), sharpe(&returns(&equity_curve), risk_free_rate))
    };
    PathResult {
        index,
        final_balance,
        max_drawdown: max_dd,
        sharpe: path_sharpe,
        equity_curve,
        trades: tally.trades,
        wins: tally.wins,
        max_consecutive_losses: tally.max_losing_streak,
        failed,
    }
}

/// Compound fixed win/loss returns for `days × trades_per_day` trades,
/// recording the balance at the end of each day.
pub fn simulate_parametric<R: Rng + ?Sized>(
    index: usize,
    initial_balance: f64,
    risk_free_rate: f64,
    params: &ParametricParams,
    rng: &mut R,
) -> PathResult {
    let mut balance = initial_balance;
    let mut equity_curve = Vec::with_capacity(params.days + 1);
    equity_curve.push(balance);
    let mut tally = Tally::default();

    for _ in 0..params.days {
        for _ in 0..params.trades_per_day {
            let won = rng.gen_bool(params.win_rate);
            balance *= if won {
                1.0 + params.avg_win
            } else {
                1.0 - params.avg_loss
            };
            tally.record(won);
        }
        equity_curve.push(balance);
        if !balance.is_finite() {
            break;
        }
    }

    finish(index, equity_curve, tally, risk_free_rate)
}

/// Replay the signal pipeline over one bootstrapped version of `history`.
///
/// The walk itself is [`walk_forward`]. The equity curve has one point per
/// bar from the warmup bar to the end of the series.
pub fn simulate_empirical<R: Rng + ?Sized>(
    index: usize,
    initial_balance: f64,
    risk_free_rate: f64,
    params: &EmpiricalParams,
    history: &[Candle],
    simulator: &TradeSimulator,
    rng: &mut R,
) -> PathResult {
    let series = block_bootstrap(history, params.block_size, rng);
    let strategy = &params.strategy;
    let warmup = strategy.warmup_bars.min(series.len().saturating_sub(1));

    let mut tally = Tally::default();
    let mut equity_curve = vec![initial_balance];
    // Extend the curve with `value` until it covers bar `upto`.
    let mark = |curve: &mut Vec<f64>, upto: usize, value: f64| {
        while warmup + curve.len() <= upto {
            curve.push(value);
        }
    };

    let balance = walk_forward(
        &series,
        strategy,
        initial_balance,
        rng,
        |request, path, rng| simulator.simulate(request, path, rng),
        |entry, outcome, balance| {
            if let Some(trade) = outcome {
                let exit_bar = entry + trade.bars_held;
                let before = equity_curve.last().copied().unwrap_or(initial_balance);
                mark(&mut equity_curve, exit_bar - 1, before);
                mark(&mut equity_curve, exit_bar, balance);
                tally.record(trade.is_win());
            }
        },
    );
    mark(&mut equity_curve, series.len().saturating_sub(1), balance);

    finish(index, equity_curve, tally, risk_free_rate)
}

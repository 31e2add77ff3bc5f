//! Running trade ledger and the metrics derived from it.

use chrono::Duration;

use crate::domain::metrics::{annualized_return, calmar, drawdown, returns, sharpe_sortino};
use crate::domain::simulator::SimulatedTrade;

/// Profit factor used for scoring is capped here so a loss-free ledger
/// does not dominate the checkpoint score.
pub const PROFIT_FACTOR_CAP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub trades: usize,
    pub rejected: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub expectancy: f64,
    pub total_pnl: f64,
    pub final_equity: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub avg_holding_time: Duration,
    pub avg_bars_held: f64,
    pub avg_abs_slippage: f64,
    /// Trades filled over proposals (trades plus rejections).
    pub fill_ratio: f64,
    /// Fraction of trades whose raw price move agreed with their direction.
    pub accuracy: f64,
}

impl PerformanceMetrics {
    /// Fixed weighted score used to pick the best checkpoint.
    pub fn score(&self) -> f64 {
        let profit_factor = if self.profit_factor.is_nan() {
            0.0
        } else {
            self.profit_factor.min(PROFIT_FACTOR_CAP)
        };
        let score = self.accuracy * 0.3
            + self.win_rate * 0.15
            + profit_factor * 0.15
            + self.expectancy * 0.1
            + (1.0 - self.max_drawdown) * 0.1
            + self.sharpe * 0.1
            + self.sortino * 0.1;
        if score.is_finite() { score } else { 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub score: f64,
    pub trade_count: usize,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    initial_balance: f64,
    risk_free_rate: f64,
    trades: Vec<SimulatedTrade>,
    rejected: usize,
    best: Option<Checkpoint>,
}

impl PerformanceTracker {
    pub fn new(initial_balance: f64, risk_free_rate: f64) -> Self {
        PerformanceTracker {
            initial_balance,
            risk_free_rate,
            trades: Vec::new(),
            rejected: 0,
            best: None,
        }
    }

    /// Record a simulator outcome; `None` counts as a rejected proposal.
    pub fn record(&mut self, outcome: Option<SimulatedTrade>) {
        match outcome {
            Some(trade) => self.trades.push(trade),
            None => self.rejected += 1,
        }
    }

    pub fn trades(&self) -> &[SimulatedTrade] {
        &self.trades
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn best(&self) -> Option<&Checkpoint> {
        self.best.as_ref()
    }

    /// Balance after each trade, starting from the initial balance.
    pub fn equity_curve(&self) -> Vec<f64> {
        let mut balance = self.initial_balance;
        let mut curve = Vec::with_capacity(self.trades.len() + 1);
        curve.push(balance);
        for trade in &self.trades {
            balance += trade.pnl;
            curve.push(balance);
        }
        curve
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        let trades = &self.trades;
        let n = trades.len();

        let (mut wins, mut losses) = (0usize, 0usize);
        let (mut gross_profit, mut gross_loss) = (0.0_f64, 0.0_f64);
        let mut correct = 0usize;
        let mut slippage = 0.0_f64;
        let mut bars_held = 0usize;
        let mut holding = Duration::zero();

        for trade in trades {
            if trade.pnl > 0.0 {
                wins += 1;
                gross_profit += trade.pnl;
            } else if trade.pnl < 0.0 {
                losses += 1;
                gross_loss += trade.pnl.abs();
            }
            if trade.direction_correct() {
                correct += 1;
            }
            slippage += trade.slippage.abs();
            bars_held += trade.bars_held;
            holding += trade.close_time - trade.open_time;
        }

        let ratio = |num: f64, den: usize| if den > 0 { num / den as f64 } else { 0.0 };
        let win_rate = ratio(wins as f64, n);
        let avg_win = ratio(gross_profit, wins);
        let avg_loss = ratio(gross_loss, losses);

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let curve = self.equity_curve();
        let final_equity = curve.last().copied().unwrap_or(self.initial_balance);
        let dd = drawdown(&curve);
        let (sharpe, sortino) = sharpe_sortino(&returns(&curve), self.risk_free_rate);

        let span_days = match (trades.first(), trades.last()) {
            (Some(first), Some(last)) => {
                (last.close_time - first.open_time).num_days().max(1) as usize
            }
            _ => 0,
        };
        let annualized = annualized_return(self.initial_balance, final_equity, span_days);

        PerformanceMetrics {
            trades: n,
            rejected: self.rejected,
            wins,
            losses,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            expectancy: win_rate * avg_win - (1.0 - win_rate) * avg_loss,
            total_pnl: gross_profit - gross_loss,
            final_equity,
            sharpe,
            sortino,
            calmar: calmar(annualized, dd.max),
            annualized_return: annualized,
            max_drawdown: dd.max,
            avg_holding_time: if n > 0 { holding / n as i32 } else { Duration::zero() },
            avg_bars_held: ratio(bars_held as f64, n),
            avg_abs_slippage: ratio(slippage, n),
            fill_ratio: ratio(n as f64, n + self.rejected),
            accuracy: ratio(correct as f64, n),
        }
    }

    /// Score the current ledger and keep it as the best checkpoint if it beats
    /// the previous best. Returns the current score.
    pub fn evaluate(&mut self) -> f64 {
        let metrics = self.metrics();
        let score = metrics.score();
        let improved = self.best.as_ref().is_none_or(|best| score > best.score);
        if improved {
            self.best = Some(Checkpoint {
                score,
                trade_count: metrics.trades,
                metrics,
            });
        }
        score
    }
}

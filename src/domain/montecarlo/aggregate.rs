//! Cross-path statistics.

use crate::domain::montecarlo::path::PathResult;
use crate::domain::stats::{mean, percentile};

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStatistics {
    pub requested_paths: usize,
    pub completed_paths: usize,
    pub failed_paths: usize,
    pub cancelled: bool,
    pub mean_final_balance: f64,
    pub median_final_balance: f64,
    /// 5th percentile of final balances.
    pub confidence95: f64,
    pub best_final_balance: f64,
    pub worst_final_balance: f64,
    pub mean_max_drawdown: f64,
    pub worst_max_drawdown: f64,
    pub mean_sharpe: f64,
    /// Winning trades over all trades across paths.
    pub win_rate: f64,
    pub total_trades: usize,
    pub max_consecutive_losses: usize,
    /// Fraction of paths ending above the initial balance.
    pub probability_of_profit: f64,
}

/// Reduce completed path results into aggregate statistics.
///
/// Results are ordered by path index before reduction, so the outcome does
/// not depend on the order in which paths finished. Failed paths are counted
/// but contribute nothing else.
pub fn aggregate(
    results: &[PathResult],
    requested_paths: usize,
    initial_balance: f64,
    cancelled: bool,
) -> AggregateStatistics {
    let mut ordered: Vec<&PathResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.index);

    let failed_paths = ordered.iter().filter(|r| r.failed).count();
    let ok: Vec<&PathResult> = ordered.into_iter().filter(|r| !r.failed).collect();

    let finals: Vec<f64> = ok.iter().map(|r| r.final_balance).collect();
    let drawdowns: Vec<f64> = ok.iter().map(|r| r.max_drawdown).collect();
    let sharpes: Vec<f64> = ok.iter().map(|r| r.sharpe).collect();

    let mut sorted_finals = finals.clone();
    sorted_finals.sort_by(f64::total_cmp);

    let total_trades: usize = ok.iter().map(|r| r.trades).sum();
    let total_wins: usize = ok.iter().map(|r| r.wins).sum();
    let profitable = finals.iter().filter(|&&b| b > initial_balance).count();

    AggregateStatistics {
        requested_paths,
        completed_paths: ok.len(),
        failed_paths,
        cancelled,
        mean_final_balance: mean(&finals),
        median_final_balance: percentile(&sorted_finals, 50.0),
        confidence95: percentile(&sorted_finals, 5.0),
        best_final_balance: sorted_finals.last().copied().unwrap_or(0.0),
        worst_final_balance: sorted_finals.first().copied().unwrap_or(0.0),
        mean_max_drawdown: mean(&drawdowns),
        worst_max_drawdown: drawdowns.iter().copied().fold(0.0, f64::max),
        mean_sharpe: mean(&sharpes),
        win_rate: if total_trades > 0 {
            total_wins as f64 / total_trades as f64
        } else {
            0.0
        },
        total_trades,
        max_consecutive_losses: ok.iter().map(|r| r.max_consecutive_losses).max().unwrap_or(0),
        probability_of_profit: if ok.is_empty() {
            0.0
        } else {
            profitable as f64 / ok.len() as f64
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(index: usize, final_balance: f64, max_drawdown: f64) -> PathResult {
        PathResult {
            index,
            final_balance,
            equity_curve: vec![100.0, final_balance],
            max_drawdown,
            sharpe: index as f64 * 0.1,
            trades: 4,
            wins: index % 3,
            max_consecutive_losses: index,
            failed: false,
        }
    }

    #[test]
    fn aggregate_basic_statistics() {
        let results: Vec<PathResult> = (0..5)
            .map(|i| path(i, 90.0 + 5.0 * i as f64, 0.01 * i as f64))
            .collect();
        let stats = aggregate(&results, 5, 100.0, false);

        assert_eq!(stats.completed_paths, 5);
        assert!((stats.mean_final_balance - 100.0).abs() < 1e-12);
        assert!((stats.median_final_balance - 100.0).abs() < 1e-12);
        assert_eq!(stats.best_final_balance, 110.0);
        assert_eq!(stats.worst_final_balance, 90.0);
        // 5th percentile between 90 and 95
        assert!((stats.confidence95 - 91.0).abs() < 1e-12);
        assert!((stats.worst_max_drawdown - 0.04).abs() < 1e-12);
        assert_eq!(stats.total_trades, 20);
        assert_eq!(stats.max_consecutive_losses, 4);
        assert!((stats.probability_of_profit - 0.4).abs() < 1e-12);
    }

    #[test]
    fn failed_paths_are_excluded() {
        let mut results: Vec<PathResult> = (0..3).map(|i| path(i, 100.0, 0.0)).collect();
        results[1].failed = true;
        results[1].final_balance = f64::NAN;
        let stats = aggregate(&results, 3, 100.0, false);
        assert_eq!(stats.failed_paths, 1);
        assert_eq!(stats.completed_paths, 2);
        assert!(stats.mean_final_balance.is_finite());
    }

    #[test]
    fn empty_run_is_all_zero() {
        let stats = aggregate(&[], 10, 100.0, true);
        assert!(stats.cancelled);
        assert_eq!(stats.completed_paths, 0);
        assert_eq!(stats.mean_final_balance, 0.0);
        assert_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn completion_order_does_not_matter() {
        let results: Vec<PathResult> = (0..50)
            .map(|i| {
                let x = i as f64;
                path(i, 100.0 + (x * 1.37).sin() * 20.0, (x * 0.71).cos().abs() * 0.3)
            })
            .collect();
        let mut shuffled = results.clone();
        shuffled.reverse();
        shuffled.swap(3, 17);
        assert_eq!(aggregate(&results, 50, 100.0, false), aggregate(&shuffled, 50, 100.0, false));
    }
}

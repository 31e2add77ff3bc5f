//! Equity-curve statistics shared by the Monte Carlo engine and the
//! performance tracker.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Peak-to-trough drawdown of an equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Drawdown {
    /// Largest fractional decline from a running peak, in [0, 1] for positive equity.
    pub max: f64,
    /// Longest run of consecutive points spent below a peak.
    pub duration: usize,
}

pub fn drawdown(equity: &[f64]) -> Drawdown {
    let Some(&first) = equity.first() else {
        return Drawdown::default();
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for &value in equity {
        if value > peak {
            peak = value;
            current_duration = 0;
        } else if peak > 0.0 && value < peak {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_duration += 1;
            if current_duration > max_duration {
                max_duration = current_duration;
            }
        }
    }

    Drawdown {
        max: max_dd,
        duration: max_duration,
    }
}

pub fn max_drawdown(equity: &[f64]) -> f64 {
    drawdown(equity).max
}

/// Simple period returns of an equity curve; a non-positive base yields 0.
pub fn returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Annualized Sharpe and Sortino ratios of per-period returns.
///
/// `annual_rf` is spread evenly over 252 periods. Both ratios are 0 when the
/// relevant deviation is 0.
pub fn sharpe_sortino(returns: &[f64], annual_rf: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let n = returns.len() as f64;
    let daily_rf = annual_rf / TRADING_DAYS_PER_YEAR;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    let excess_return = mean - daily_rf;

    let sharpe = if stddev > 0.0 {
        (excess_return / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside: f64 = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum();
    let downside_stddev = (downside / n).sqrt();

    let sortino = if downside_stddev > 0.0 {
        (excess_return / downside_stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (finite_or_zero(sharpe), finite_or_zero(sortino))
}

pub fn sharpe(returns: &[f64], annual_rf: f64) -> f64 {
    sharpe_sortino(returns, annual_rf).0
}

/// Compound annual growth over `periods` trading days.
pub fn annualized_return(initial: f64, last: f64, periods: usize) -> f64 {
    if initial <= 0.0 || periods == 0 {
        return 0.0;
    }
    let total = last / initial;
    if total <= 0.0 {
        return -1.0;
    }
    let years = periods as f64 / TRADING_DAYS_PER_YEAR;
    finite_or_zero(total.powf(1.0 / years) - 1.0)
}

/// Annualized return over max drawdown; 0 without a drawdown.
pub fn calmar(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown > 0.0 {
        finite_or_zero(annualized_return / max_drawdown)
    } else {
        0.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawdown_empty_curve() {
        assert_eq!(drawdown(&[]), Drawdown::default());
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        let equity = [100.0, 110.0, 90.0, 95.0, 80.0, 100.0];
        assert!((max_drawdown(&equity) - (110.0 - 80.0) / 110.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_duration() {
        let equity = [100.0, 110.0, 100.0, 90.0, 85.0, 95.0];
        assert_eq!(drawdown(&equity).duration, 4);
    }

    #[test]
    fn monotonic_curve_has_no_drawdown() {
        let equity: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        assert_eq!(max_drawdown(&equity), 0.0);
    }

    #[test]
    fn returns_guard_zero_base() {
        assert_eq!(returns(&[0.0, 10.0, 11.0]), vec![0.0, 0.1]);
    }

    #[test]
    fn sharpe_ratio_positive() {
        let equity: Vec<f64> = (0..253).map(|i| 100_000.0 * (1.0 + 0.001 * i as f64)).collect();
        assert!(sharpe(&returns(&equity), 0.0) > 0.0);
    }

    #[test]
    fn sortino_exceeds_sharpe_with_few_losses() {
        let equity = [100.0, 101.0, 100.5, 101.5, 100.0, 102.0];
        let (sharpe, sortino) = sharpe_sortino(&returns(&equity), 0.0);
        assert!(sharpe > 0.0);
        assert!(sortino > sharpe);
    }

    #[test]
    fn flat_returns_have_zero_ratios() {
        assert_eq!(sharpe_sortino(&[0.0; 10], 0.0), (0.0, 0.0));
    }

    #[test]
    fn annualized_return_flat_year() {
        assert!(annualized_return(100.0, 100.0, 252).abs() < 1e-12);
        assert!((annualized_return(100.0, 110.0, 252) - 0.10).abs() < 1e-9);
        assert_eq!(annualized_return(100.0, 0.0, 252), -1.0);
    }

    #[test]
    fn calmar_ratio() {
        assert!((calmar(0.2, 0.1) - 2.0).abs() < 1e-12);
        assert_eq!(calmar(0.2, 0.0), 0.0);
    }
}

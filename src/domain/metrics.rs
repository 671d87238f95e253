//! Performance statistics over a backtest result.

use crate::domain::backtest::{BacktestResult, EquityPoint};

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let initial_capital = result.initial_capital;

        let total_return = if initial_capital > 0.0 {
            (result.final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let max_drawdown = compute_drawdown(&result.equity_curve);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for trade in &result.closed_trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
        }

        let total_trades = trades_won + trades_lost + trades_breakeven;
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };
        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            max_drawdown,
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = match equity_curve.first() {
        Some(p) => p.equity,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{ClosedTrade, ExitReason, Side};
    use chrono::{TimeZone, Utc};

    fn ts(minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap()
    }

    fn trade(pnl: f64) -> ClosedTrade {
        ClosedTrade {
            symbol: "VIX".into(),
            side: Side::Buy,
            size: 1.0,
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            opened_at: ts(0),
            closed_at: ts(1),
            pnl,
            exit: ExitReason::TakeProfit,
        }
    }

    fn result(trades: Vec<ClosedTrade>, equity: &[f64]) -> BacktestResult {
        BacktestResult {
            initial_capital: 10_000.0,
            final_equity: *equity.last().unwrap_or(&10_000.0),
            equity_curve: equity
                .iter()
                .enumerate()
                .map(|(i, &e)| EquityPoint {
                    timestamp: ts(i as u32),
                    equity: e,
                })
                .collect(),
            closed_trades: trades,
            bars_processed: equity.len(),
        }
    }

    #[test]
    fn empty_result_is_all_zeroes() {
        let metrics = Metrics::compute(&result(vec![], &[10_000.0]));
        assert_eq!(metrics.total_trades, 0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.profit_factor, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
    }

    #[test]
    fn total_return_from_final_equity() {
        let metrics = Metrics::compute(&result(vec![], &[10_000.0, 10_500.0, 11_000.0]));
        assert!((metrics.total_return - 0.10).abs() < 1e-12);
    }

    #[test]
    fn win_loss_accounting() {
        let trades = vec![trade(10.0), trade(-5.0), trade(20.0), trade(0.0)];
        let metrics = Metrics::compute(&result(trades, &[10_000.0, 10_025.0]));

        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.trades_won, 2);
        assert_eq!(metrics.trades_lost, 1);
        assert_eq!(metrics.trades_breakeven, 1);
        assert!((metrics.win_rate - 0.5).abs() < 1e-12);
        assert!((metrics.profit_factor - 6.0).abs() < 1e-12);
        assert!((metrics.avg_win - 15.0).abs() < 1e-12);
        assert!((metrics.avg_loss - 5.0).abs() < 1e-12);
        assert!((metrics.largest_win - 20.0).abs() < 1e-12);
        assert!((metrics.largest_loss - 5.0).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_infinite_with_no_losses() {
        let metrics = Metrics::compute(&result(vec![trade(10.0)], &[10_000.0, 10_010.0]));
        assert!(metrics.profit_factor.is_infinite());
    }

    #[test]
    fn drawdown_tracks_peak_to_trough() {
        let metrics = Metrics::compute(&result(
            vec![],
            &[10_000.0, 11_000.0, 9_900.0, 10_500.0, 10_450.0],
        ));
        // Peak 11_000 to trough 9_900: 10%.
        assert!((metrics.max_drawdown - 0.1).abs() < 1e-12);
    }
}

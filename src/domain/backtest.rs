//! Historical replay through the live decision pipeline.
//!
//! Bars are fed oldest-first through the same snapshot/classify/gate/build
//! path the live engine uses; only the broker is simulated. Entries fill at
//! a synthetic quote around the bar close; bracket exits are checked against
//! each subsequent bar's range before the next decision. When a bar's range
//! covers both the stop and the target, the stop fills: intrabar ordering
//! is unknowable from OHLC data, so the loss side is assumed.

use crate::domain::bar::PriceBar;
use crate::domain::error::TraderError;
use crate::domain::indicator::{compute_snapshot, required_window};
use crate::domain::order::build_order;
use crate::domain::position::{ClosedTrade, ExitReason, Position, PositionGate, Side};
use crate::domain::quote::Quote;
use crate::domain::signal::{classify, Signal};
use crate::domain::strategy::StrategyConfig;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Commission charged on each fill, as a percentage of notional.
    pub commission_pct: f64,
    /// Synthetic ask/bid spread around the bar close, in price units.
    pub spread: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
            commission_pct: 0.0,
            spread: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub closed_trades: Vec<ClosedTrade>,
    pub bars_processed: usize,
}

/// Replay `bars` for one symbol. Fails with `InsufficientData` when the
/// series is shorter than the indicator window, `ConfigInvalid` when the
/// strategy config is malformed.
pub fn run_backtest(
    bars: &[PriceBar],
    symbol: &str,
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> Result<BacktestResult, TraderError> {
    strategy.validate()?;

    let window = required_window(strategy);
    if bars.len() < window {
        return Err(TraderError::InsufficientData {
            have: bars.len(),
            need: window,
        });
    }

    let mut gate = PositionGate::new();
    let mut cash = config.initial_capital;
    let mut equity_curve = Vec::with_capacity(bars.len() - window + 1);
    let mut closed_trades = Vec::new();

    for i in (window - 1)..bars.len() {
        let bar = &bars[i];

        // Bracket exits first: a position opened on an earlier bar may have
        // been stopped out or have hit its target inside this bar.
        if let Some(position) = gate.open_position().cloned() {
            if let Some((exit_price, reason)) = bracket_exit(&position, bar) {
                let trade = settle(&position, exit_price, bar.timestamp, reason, config);
                cash += trade.pnl;
                closed_trades.push(trade);
                gate.on_position_closed();
            }
        }

        let snapshot = compute_snapshot(&bars[..=i], strategy)?;
        let quote = Quote {
            ask: bar.close + config.spread / 2.0,
            bid: bar.close - config.spread / 2.0,
        };

        let signal = classify(&snapshot, &quote, strategy);
        if signal != Signal::Hold && gate.can_enter() {
            let reference_price = match signal {
                Signal::Buy => quote.ask,
                Signal::Sell => quote.bid,
                Signal::Hold => unreachable!("hold filtered above"),
            };
            let spec = build_order(signal, symbol, reference_price, strategy)?;
            gate.on_order_accepted(&spec, spec.price, bar.timestamp)?;
        }

        let unrealized = gate
            .open_position()
            .map(|p| p.unrealized_pnl(bar.close))
            .unwrap_or(0.0);
        equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity: cash + unrealized,
        });
    }

    // Anything still open settles at the last close.
    if let (Some(position), Some(last)) = (gate.open_position().cloned(), bars.last()) {
        let trade = settle(
            &position,
            last.close,
            last.timestamp,
            ExitReason::EndOfData,
            config,
        );
        cash += trade.pnl;
        closed_trades.push(trade);
        gate.on_position_closed();
        if let Some(point) = equity_curve.last_mut() {
            point.equity = cash;
        }
    }

    Ok(BacktestResult {
        initial_capital: config.initial_capital,
        final_equity: cash,
        equity_curve,
        closed_trades,
        bars_processed: bars.len() - window + 1,
    })
}

/// Stop/target trigger inside one bar, stop checked first.
fn bracket_exit(position: &Position, bar: &PriceBar) -> Option<(f64, ExitReason)> {
    let (stop_hit, target_hit) = if position.side.is_long() {
        (
            bar.low <= position.stop_loss,
            bar.high >= position.take_profit,
        )
    } else {
        (
            bar.high >= position.stop_loss,
            bar.low <= position.take_profit,
        )
    };

    if stop_hit {
        Some((position.stop_loss, ExitReason::StopLoss))
    } else if target_hit {
        Some((position.take_profit, ExitReason::TakeProfit))
    } else {
        None
    }
}

fn settle(
    position: &Position,
    exit_price: f64,
    closed_at: DateTime<Utc>,
    exit: ExitReason,
    config: &BacktestConfig,
) -> ClosedTrade {
    let direction = if position.side.is_long() { 1.0 } else { -1.0 };
    let gross = direction * position.size * (exit_price - position.open_price);
    let commission = config.commission_pct / 100.0
        * position.size
        * (position.open_price + exit_price);

    ClosedTrade {
        symbol: position.symbol.clone(),
        side: position.side,
        size: position.size,
        entry_price: position.open_price,
        exit_price,
        opened_at: position.opened_at,
        closed_at,
        pnl: gross - commission,
        exit,
    }
}

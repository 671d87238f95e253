//! Position tracking and the single-position gate.

use crate::domain::error::TraderError;
use crate::domain::order::OrderSpec;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_long(&self) -> bool {
        matches!(self, Side::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// An open bracket position. Created when the broker accepts an order,
/// cleared when the broker reports it closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub size: f64,
    pub open_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        let direction = if self.side.is_long() { 1.0 } else { -1.0 };
        direction * self.size * (price - self.open_price)
    }

    pub fn should_stop_out(&self, price: f64) -> bool {
        if self.side.is_long() {
            price <= self.stop_loss
        } else {
            price >= self.stop_loss
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        if self.side.is_long() {
            price >= self.take_profit
        } else {
            price <= self.take_profit
        }
    }
}

/// Why a simulated position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub side: Side,
    pub size: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub pnl: f64,
    pub exit: ExitReason,
}

/// Enforces "at most one open position per symbol".
///
/// The only long-lived mutable state in the core. One gate per symbol; a
/// cycle must run `can_enter` and `on_order_accepted` without another cycle
/// interleaving (the engine is sequential per symbol, see the engine module).
#[derive(Debug, Default)]
pub struct PositionGate {
    open: Option<Position>,
}

impl PositionGate {
    pub fn new() -> Self {
        PositionGate { open: None }
    }

    /// True iff no position is currently tracked.
    pub fn can_enter(&self) -> bool {
        self.open.is_none()
    }

    pub fn open_position(&self) -> Option<&Position> {
        self.open.as_ref()
    }

    /// Record the position created by an accepted order. Callers must check
    /// `can_enter` first; a second accept without an intervening close is
    /// rejected rather than silently replacing the tracked position.
    pub fn on_order_accepted(
        &mut self,
        spec: &OrderSpec,
        fill_price: f64,
        filled_at: DateTime<Utc>,
    ) -> Result<&Position, TraderError> {
        if self.open.is_some() {
            return Err(TraderError::PositionAlreadyOpen {
                symbol: spec.symbol.clone(),
            });
        }

        Ok(self.open.insert(Position {
            symbol: spec.symbol.clone(),
            side: spec.side,
            size: spec.size,
            open_price: fill_price,
            stop_loss: spec.stop_loss,
            take_profit: spec.take_profit,
            opened_at: filled_at,
        }))
    }

    /// Clear the tracked position once the broker reports it closed.
    pub fn on_position_closed(&mut self) -> Option<Position> {
        self.open.take()
    }
}

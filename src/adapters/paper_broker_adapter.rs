//! Paper broker: a market port over a recorded bar series.
//!
//! Each `get_quote` serves the next bar's close (± half the configured
//! spread) and advances the replay cursor; advancing onto a bar checks any
//! open position against that bar's range and closes it broker-side at the
//! stop or target, which the engine then discovers through its
//! reconciliation query. Exhausting the series trips the shared shutdown
//! flag so the decision loop ends cleanly.

use crate::domain::bar::PriceBar;
use crate::domain::error::TraderError;
use crate::domain::order::OrderSpec;
use crate::domain::position::Position;
use crate::domain::quote::Quote;
use crate::ports::market_port::{MarketPort, OrderResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Broker code returned when an order arrives while a position is open.
pub const REJECT_POSITION_OPEN: i32 = 10027;

pub struct PaperBroker {
    bars: Vec<PriceBar>,
    spread: f64,
    cursor: usize,
    position: Option<Position>,
    shutdown: Arc<AtomicBool>,
}

impl PaperBroker {
    pub fn new(bars: Vec<PriceBar>, spread: f64, shutdown: Arc<AtomicBool>) -> Self {
        PaperBroker {
            bars,
            spread,
            cursor: 0,
            position: None,
            shutdown,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Close an open position if the bar's range covers its stop or target.
    /// Stop first when both are inside the bar.
    fn check_bracket(&mut self, bar: &PriceBar) {
        let Some(position) = &self.position else {
            return;
        };

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
            debug!(symbol = %position.symbol, stop = position.stop_loss, "paper stop-loss hit");
            self.position = None;
        } else if target_hit {
            debug!(symbol = %position.symbol, target = position.take_profit, "paper take-profit hit");
            self.position = None;
        }
    }
}

impl MarketPort for PaperBroker {
    fn get_quote(&mut self, symbol: &str) -> Result<Quote, TraderError> {
        if self.cursor >= self.bars.len() {
            self.shutdown.store(true, Ordering::SeqCst);
            return Err(TraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "end of recorded data".to_string(),
            });
        }

        let bar = self.bars[self.cursor].clone();
        self.check_bracket(&bar);
        self.cursor += 1;

        Ok(Quote {
            ask: bar.close + self.spread / 2.0,
            bid: bar.close - self.spread / 2.0,
        })
    }

    fn get_bars(&mut self, _symbol: &str, count: usize) -> Result<Vec<PriceBar>, TraderError> {
        let end = self.cursor;
        let start = end.saturating_sub(count);
        Ok(self.bars[start..end].to_vec())
    }

    fn submit_order(&mut self, spec: &OrderSpec) -> Result<OrderResult, TraderError> {
        if self.position.is_some() {
            return Ok(OrderResult::rejected(REJECT_POSITION_OPEN));
        }

        let filled_at = self
            .bars
            .get(self.cursor.saturating_sub(1))
            .map(|b| b.timestamp)
            .unwrap_or_else(chrono::Utc::now);

        self.position = Some(Position {
            symbol: spec.symbol.clone(),
            side: spec.side,
            size: spec.size,
            open_price: spec.price,
            stop_loss: spec.stop_loss,
            take_profit: spec.take_profit,
            opened_at: filled_at,
        });

        Ok(OrderResult::filled(spec.price))
    }

    fn open_position(&mut self, _symbol: &str) -> Result<Option<Position>, TraderError> {
        Ok(self.position.clone())
    }
}

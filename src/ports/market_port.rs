//! Market/broker capability port trait.
//!
//! The core treats the brokerage connection as an opaque collaborator: it
//! fetches quotes and bars, submits orders, and reports the open position.
//! Transport concerns (timeouts, retries, reconnects) live behind this trait.

use crate::domain::bar::PriceBar;
use crate::domain::error::TraderError;
use crate::domain::order::OrderSpec;
use crate::domain::position::Position;
use crate::domain::quote::Quote;

/// Broker verdict on a submitted order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderResult {
    pub accepted: bool,
    pub fill_price: Option<f64>,
    pub error_code: Option<i32>,
}

impl OrderResult {
    pub fn filled(price: f64) -> Self {
        OrderResult {
            accepted: true,
            fill_price: Some(price),
            error_code: None,
        }
    }

    pub fn rejected(code: i32) -> Self {
        OrderResult {
            accepted: false,
            fill_price: None,
            error_code: Some(code),
        }
    }
}

pub trait MarketPort {
    /// Best bid/ask right now.
    fn get_quote(&mut self, symbol: &str) -> Result<Quote, TraderError>;

    /// The most recent `count` bars, oldest first.
    fn get_bars(&mut self, symbol: &str, count: usize) -> Result<Vec<PriceBar>, TraderError>;

    /// Submit a bracket order. `Err` is a transport failure; a rejection is
    /// an `Ok` result with `accepted == false`.
    fn submit_order(&mut self, spec: &OrderSpec) -> Result<OrderResult, TraderError>;

    /// The broker-side open position for `symbol`, if any. Drives the
    /// engine's reconciliation of locally-tracked position state.
    fn open_position(&mut self, symbol: &str) -> Result<Option<Position>, TraderError>;
}

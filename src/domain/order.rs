//! Bracket order construction.
//!
//! One builder for both sides; the buy/sell asymmetry lives in the sign of
//! the stop and target distances, not in duplicated call sites.

use crate::domain::error::TraderError;
use crate::domain::position::Side;
use crate::domain::signal::Signal;
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInForce {
    GoodTilCancelled,
    ImmediateOrCancel,
}

/// A fully-specified bracket order: entry plus stop-loss and take-profit
/// exits. Constructed fresh per submission, never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub symbol: String,
    pub side: Side,
    pub size: f64,
    pub price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub slippage: f64,
    pub time_in_force: TimeInForce,
}

/// Build the bracket order for a non-HOLD signal.
///
/// `reference_price` must be the ask for a buy and the bid for a sell: the
/// side the order actually transacts against. Distances are configured in
/// price increments and scaled by `price_increment` into price units.
pub fn build_order(
    signal: Signal,
    symbol: &str,
    reference_price: f64,
    config: &StrategyConfig,
) -> Result<OrderSpec, TraderError> {
    let side = match signal {
        Signal::Buy => Side::Buy,
        Signal::Sell => Side::Sell,
        Signal::Hold => return Err(TraderError::InvalidSignal),
    };

    let stop_distance = config.stop_loss_distance * config.price_increment;
    let profit_distance = config.take_profit_distance * config.price_increment;

    let (stop_loss, take_profit) = match side {
        Side::Buy => (
            reference_price - stop_distance,
            reference_price + profit_distance,
        ),
        Side::Sell => (
            reference_price + stop_distance,
            reference_price - profit_distance,
        ),
    };

    Ok(OrderSpec {
        symbol: symbol.to_string(),
        side,
        size: config.lot_size,
        price: reference_price,
        stop_loss,
        take_profit,
        slippage: config.slippage_tolerance,
        time_in_force: TimeInForce::GoodTilCancelled,
    })
}

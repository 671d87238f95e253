//! The decision loop: snapshot, classify, gate, build, submit.
//!
//! One engine per traded symbol, driven strictly sequentially: a cycle runs
//! to completion before the next begins, so `can_enter`/`on_order_accepted`
//! can never interleave and the single-position invariant holds. Recoverable
//! failures become [`CycleOutcome`] values and never escape the loop; only
//! defects (a HOLD reaching the order builder, a double-open) propagate.

use crate::domain::error::TraderError;
use crate::domain::indicator::{compute_snapshot, required_window};
use crate::domain::order::build_order;
use crate::domain::position::{PositionGate, Side};
use crate::domain::signal::{classify, Signal};
use crate::domain::strategy::StrategyConfig;
use crate::ports::clock_port::ClockPort;
use crate::ports::market_port::MarketPort;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

/// What one decision cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// An external call (quote, bars, submission transport) failed; retry
    /// after the short backoff.
    DataUnavailable,
    /// Not enough bars for the indicator window yet.
    InsufficientData,
    /// Signal classified as HOLD.
    Hold,
    /// A signal fired but a position is already open.
    Suppressed(Signal),
    /// Order accepted and the position is now tracked.
    Entered { side: Side, fill_price: f64 },
    /// Broker declined the order; no position state was changed.
    Rejected { code: i32 },
}

pub struct TradeEngine {
    symbol: String,
    config: StrategyConfig,
    gate: PositionGate,
}

impl TradeEngine {
    pub fn new(symbol: impl Into<String>, config: StrategyConfig) -> Self {
        TradeEngine {
            symbol: symbol.into(),
            config,
            gate: PositionGate::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn gate(&self) -> &PositionGate {
        &self.gate
    }

    /// Run one full decision cycle against the market port.
    pub fn run_cycle(&mut self, market: &mut dyn MarketPort) -> Result<CycleOutcome, TraderError> {
        self.reconcile(market);

        let quote = match market.get_quote(&self.symbol) {
            Ok(q) => q,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "quote fetch failed, skipping cycle");
                return Ok(CycleOutcome::DataUnavailable);
            }
        };

        let window = required_window(&self.config);
        let bars = match market.get_bars(&self.symbol, window) {
            Ok(b) => b,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "bar fetch failed, skipping cycle");
                return Ok(CycleOutcome::DataUnavailable);
            }
        };

        let snapshot = match compute_snapshot(&bars, &self.config) {
            Ok(s) => s,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "skipping cycle");
                return Ok(CycleOutcome::InsufficientData);
            }
        };

        let signal = classify(&snapshot, &quote, &self.config);
        info!(
            symbol = %self.symbol,
            signal = %signal,
            rsi = snapshot.rsi,
            macd = snapshot.macd_line,
            macd_signal = snapshot.macd_signal,
            bid = quote.bid,
            ask = quote.ask,
            "cycle classified"
        );

        if signal == Signal::Hold {
            return Ok(CycleOutcome::Hold);
        }

        if !self.gate.can_enter() {
            info!(symbol = %self.symbol, signal = %signal, "position open, entry suppressed");
            return Ok(CycleOutcome::Suppressed(signal));
        }

        // Enter at the side the order transacts against: ask for buys,
        // bid for sells.
        let reference_price = match signal {
            Signal::Buy => quote.ask,
            Signal::Sell => quote.bid,
            Signal::Hold => unreachable!("hold handled above"),
        };

        let spec = build_order(signal, &self.symbol, reference_price, &self.config)?;

        let result = match market.submit_order(&spec) {
            Ok(r) => r,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "order submission failed");
                return Ok(CycleOutcome::DataUnavailable);
            }
        };

        if !result.accepted {
            let code = result.error_code.unwrap_or(-1);
            warn!(symbol = %self.symbol, code, "order rejected, no position opened");
            return Ok(CycleOutcome::Rejected { code });
        }

        let fill_price = result.fill_price.unwrap_or(spec.price);
        self.gate.on_order_accepted(&spec, fill_price, Utc::now())?;
        info!(
            symbol = %self.symbol,
            side = %spec.side,
            fill_price,
            stop_loss = spec.stop_loss,
            take_profit = spec.take_profit,
            "order accepted, position opened"
        );

        Ok(CycleOutcome::Entered {
            side: spec.side,
            fill_price,
        })
    }

    /// Run cycles until `shutdown` is set, sleeping the poll interval between
    /// cycles (the shorter backoff after a data failure). The flag is checked
    /// once per cycle, never mid-cycle.
    pub fn run(
        &mut self,
        market: &mut dyn MarketPort,
        clock: &dyn ClockPort,
        shutdown: &AtomicBool,
    ) -> Result<(), TraderError> {
        info!(symbol = %self.symbol, "decision loop started");

        while !shutdown.load(Ordering::SeqCst) {
            let outcome = match self.run_cycle(market) {
                Ok(o) => o,
                Err(e) => {
                    error!(symbol = %self.symbol, error = %e, "defect in decision cycle");
                    return Err(e);
                }
            };

            let wait = match outcome {
                CycleOutcome::DataUnavailable => {
                    Duration::from_secs(self.config.retry_backoff_secs)
                }
                _ => Duration::from_secs(self.config.poll_interval_secs),
            };
            clock.sleep(wait);
        }

        info!(symbol = %self.symbol, "decision loop stopped");
        Ok(())
    }

    /// Re-sync the gate with the broker: a position the broker no longer
    /// reports (stop or target hit, manual close) is cleared locally. A
    /// failed query leaves the gate untouched; the next cycle retries.
    fn reconcile(&mut self, market: &mut dyn MarketPort) {
        if self.gate.can_enter() {
            return;
        }

        match market.open_position(&self.symbol) {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Some(closed) = self.gate.on_position_closed() {
                    info!(
                        symbol = %self.symbol,
                        side = %closed.side,
                        open_price = closed.open_price,
                        "broker reports position closed"
                    );
                }
            }
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "position query failed, keeping local state");
            }
        }
    }
}

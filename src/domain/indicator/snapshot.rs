//! Latest-value indicator snapshot for the decision engine.
//!
//! The engine only ever acts on the most recent value of each series; the
//! rest of the series is discarded after computation.

use crate::domain::bar::PriceBar;
use crate::domain::error::TraderError;
use crate::domain::indicator::{
    bollinger::calculate_bollinger, macd::calculate_macd, rsi::calculate_rsi, IndicatorValue,
};
use crate::domain::strategy::StrategyConfig;

/// Latest RSI, MACD and Bollinger values over one bar window. Recomputed
/// every cycle, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub boll_upper: f64,
    pub boll_middle: f64,
    pub boll_lower: f64,
}

/// Minimum number of bars for every indicator in the snapshot to be past
/// its warmup: RSI needs period+1 bars (one extra for the first change),
/// the MACD signal line needs slow+signal-1, Bollinger needs its period.
pub fn required_window(config: &StrategyConfig) -> usize {
    (config.rsi_period + 1)
        .max(config.macd_slow + config.macd_signal - 1)
        .max(config.bollinger_period)
}

/// Compute the snapshot for the latest bar of `bars`.
///
/// Fails with `InsufficientData` when the window is shorter than
/// [`required_window`]; deterministic and side-effect-free otherwise.
pub fn compute_snapshot(
    bars: &[PriceBar],
    config: &StrategyConfig,
) -> Result<IndicatorSnapshot, TraderError> {
    let need = required_window(config);
    if bars.len() < need {
        return Err(TraderError::InsufficientData {
            have: bars.len(),
            need,
        });
    }

    let rsi_series = calculate_rsi(bars, config.rsi_period);
    let macd_series = calculate_macd(
        bars,
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    );
    let boll_series = calculate_bollinger(bars, config.bollinger_period, config.bollinger_deviation);

    let rsi = rsi_series
        .last()
        .map(|p| p.value.simple())
        .unwrap_or_default();

    let (macd_line, macd_signal) = match macd_series.last().map(|p| &p.value) {
        Some(IndicatorValue::Macd { line, signal, .. }) => (*line, *signal),
        _ => (0.0, 0.0),
    };

    let (boll_upper, boll_middle, boll_lower) = match boll_series.last().map(|p| &p.value) {
        Some(IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        }) => (*upper, *middle, *lower),
        _ => (0.0, 0.0, 0.0),
    };

    Ok(IndicatorSnapshot {
        rsi,
        macd_line,
        macd_signal,
        boll_upper,
        boll_middle,
        boll_lower,
    })
}

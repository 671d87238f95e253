//! Technical indicator implementations.
//!
//! Each indicator produces a series of [`IndicatorPoint`]s aligned with the
//! input bars. Warmup points are marked invalid; callers must check `valid`
//! before reading a value. The decision engine only ever consumes the latest
//! point of each series (see [`snapshot`]).

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod snapshot;

pub use snapshot::{compute_snapshot, required_window, IndicatorSnapshot};

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

impl IndicatorValue {
    /// Raw value for single-valued indicators, 0.0 otherwise.
    pub fn simple(&self) -> f64 {
        match self {
            IndicatorValue::Simple(v) => *v,
            _ => 0.0,
        }
    }
}

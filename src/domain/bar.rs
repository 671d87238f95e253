//! Price bar representation.

use chrono::{DateTime, Utc};

/// One OHLCV bar. Sequences are ordered oldest to newest and immutable once
/// fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// True when `price` falls inside this bar's traded range.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

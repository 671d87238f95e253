//! Rule-based signal classification.

use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::quote::Quote;
use crate::domain::strategy::StrategyConfig;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Classify one snapshot/quote pair. Pure function; first match wins.
///
/// BUY: oversold RSI, bullish MACD crossover, bid at or below the lower band.
/// SELL: overbought RSI, bearish MACD crossover, ask at or above the upper band.
/// Valid configs keep the RSI bands disjoint so both can never hold at once;
/// BUY is still checked first as the fixed tie-break.
pub fn classify(snapshot: &IndicatorSnapshot, quote: &Quote, config: &StrategyConfig) -> Signal {
    if snapshot.rsi < config.rsi_oversold
        && snapshot.macd_line > snapshot.macd_signal
        && quote.bid <= snapshot.boll_lower
    {
        return Signal::Buy;
    }

    if snapshot.rsi > config.rsi_overbought
        && snapshot.macd_line < snapshot.macd_signal
        && quote.ask >= snapshot.boll_upper
    {
        return Signal::Sell;
    }

    Signal::Hold
}

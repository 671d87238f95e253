#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use pulsetrader::domain::bar::PriceBar;
use pulsetrader::domain::error::TraderError;
use pulsetrader::domain::order::OrderSpec;
use pulsetrader::domain::position::Position;
use pulsetrader::domain::quote::Quote;
use pulsetrader::domain::strategy::StrategyConfig;
use pulsetrader::ports::market_port::{MarketPort, OrderResult};

/// Builder-style mock broker for engine scenarios.
pub struct MockMarket {
    pub quote: Option<Quote>,
    pub bars: Option<Vec<PriceBar>>,
    pub submit_result: OrderResult,
    pub broker_position: Option<Position>,
    pub submitted: Vec<OrderSpec>,
}

impl MockMarket {
    pub fn new() -> Self {
        MockMarket {
            quote: None,
            bars: None,
            submit_result: OrderResult::filled(0.0),
            broker_position: None,
            submitted: Vec::new(),
        }
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_bars(mut self, bars: Vec<PriceBar>) -> Self {
        self.bars = Some(bars);
        self
    }

    pub fn with_submit_result(mut self, result: OrderResult) -> Self {
        self.submit_result = result;
        self
    }
}

impl MarketPort for MockMarket {
    fn get_quote(&mut self, symbol: &str) -> Result<Quote, TraderError> {
        self.quote.ok_or_else(|| TraderError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no quote scripted".into(),
        })
    }

    fn get_bars(&mut self, symbol: &str, _count: usize) -> Result<Vec<PriceBar>, TraderError> {
        self.bars
            .clone()
            .ok_or_else(|| TraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no bars scripted".into(),
            })
    }

    fn submit_order(&mut self, spec: &OrderSpec) -> Result<OrderResult, TraderError> {
        self.submitted.push(spec.clone());
        Ok(self.submit_result)
    }

    fn open_position(&mut self, _symbol: &str) -> Result<Option<Position>, TraderError> {
        Ok(self.broker_position.clone())
    }
}

pub fn make_bar(minute: u32, close: f64) -> PriceBar {
    PriceBar {
        timestamp: Utc
            .with_ymd_and_hms(2024, 1, 1, minute / 60, minute % 60, 0)
            .unwrap(),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000,
    }
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as u32, close))
        .collect()
}

/// Unit-increment strategy so bracket distances read directly in price units.
pub fn test_strategy() -> StrategyConfig {
    StrategyConfig {
        price_increment: 1.0,
        ..StrategyConfig::default()
    }
}

/// Long decline, then a small bounce: RSI stays oversold while the MACD
/// line crosses above its lagging signal. Quotes below the lower band turn
/// this into a BUY setup.
pub fn oversold_bounce_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..36).map(|i| 200.0 - i as f64 * 2.0).collect();
    let last = *closes.last().unwrap();
    closes.extend([last + 0.5, last + 1.0, last + 1.5, last + 2.0]);
    closes
}

/// Same shape, but ending with a sharp dip through the lower band so the
/// final bar's own close satisfies all three BUY conditions, which is what
/// the backtest's close-derived quotes need.
pub fn oversold_dip_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..36).map(|i| 200.0 - i as f64 * 2.0).collect();
    let last = *closes.last().unwrap();
    closes.extend([last + 2.0, last + 4.0, last + 6.0, last - 10.0]);
    closes
}

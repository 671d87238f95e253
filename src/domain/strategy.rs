//! Strategy configuration.
//!
//! One immutable bundle loaded at startup and passed by reference into every
//! component; there is no process-wide mutable configuration.

use crate::domain::error::TraderError;
use crate::ports::config_port::ConfigPort;

/// Indicator, bracket and cadence parameters for one traded instrument.
///
/// `stop_loss_distance`, `take_profit_distance` and `slippage_tolerance` are
/// expressed in price increments; `price_increment` converts them into the
/// instrument's price units (0.0001 for most currency pairs, 1.0 for
/// index-like symbols).
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_deviation: f64,
    pub stop_loss_distance: f64,
    pub take_profit_distance: f64,
    pub lot_size: f64,
    pub slippage_tolerance: f64,
    pub price_increment: f64,
    pub poll_interval_secs: u64,
    pub retry_backoff_secs: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_deviation: 2.0,
            stop_loss_distance: 10.0,
            take_profit_distance: 20.0,
            lot_size: 1.0,
            slippage_tolerance: 10.0,
            price_increment: 0.0001,
            poll_interval_secs: 60,
            retry_backoff_secs: 5,
        }
    }
}

impl StrategyConfig {
    /// Read the `[strategy]` and `[trading]` sections, falling back to the
    /// documented defaults, then validate.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let defaults = StrategyConfig::default();
        let built = StrategyConfig {
            rsi_period: config.get_int("strategy", "rsi_period", defaults.rsi_period as i64)
                as usize,
            rsi_overbought: config.get_double(
                "strategy",
                "rsi_overbought",
                defaults.rsi_overbought,
            ),
            rsi_oversold: config.get_double("strategy", "rsi_oversold", defaults.rsi_oversold),
            macd_fast: config.get_int("strategy", "macd_fast", defaults.macd_fast as i64) as usize,
            macd_slow: config.get_int("strategy", "macd_slow", defaults.macd_slow as i64) as usize,
            macd_signal: config.get_int("strategy", "macd_signal", defaults.macd_signal as i64)
                as usize,
            bollinger_period: config.get_int(
                "strategy",
                "bollinger_period",
                defaults.bollinger_period as i64,
            ) as usize,
            bollinger_deviation: config.get_double(
                "strategy",
                "bollinger_deviation",
                defaults.bollinger_deviation,
            ),
            stop_loss_distance: config.get_double(
                "strategy",
                "stop_loss_distance",
                defaults.stop_loss_distance,
            ),
            take_profit_distance: config.get_double(
                "strategy",
                "take_profit_distance",
                defaults.take_profit_distance,
            ),
            lot_size: config.get_double("strategy", "lot_size", defaults.lot_size),
            slippage_tolerance: config.get_double(
                "strategy",
                "slippage_tolerance",
                defaults.slippage_tolerance,
            ),
            price_increment: config.get_double(
                "strategy",
                "price_increment",
                defaults.price_increment,
            ),
            poll_interval_secs: config.get_int(
                "trading",
                "poll_interval",
                defaults.poll_interval_secs as i64,
            ) as u64,
            retry_backoff_secs: config.get_int(
                "trading",
                "retry_backoff",
                defaults.retry_backoff_secs as i64,
            ) as u64,
        };
        built.validate()?;
        Ok(built)
    }

    /// Check every startup invariant; any violation is fatal before the
    /// decision loop starts.
    pub fn validate(&self) -> Result<(), TraderError> {
        self.validate_periods()?;
        self.validate_rsi_thresholds()?;
        self.validate_bollinger()?;
        self.validate_distances()?;
        self.validate_sizing()?;
        self.validate_cadence()?;
        Ok(())
    }

    fn validate_periods(&self) -> Result<(), TraderError> {
        for (key, value) in [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
        ] {
            if value == 0 {
                return Err(invalid(key, format!("{key} must be at least 1")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(invalid(
                "macd_fast",
                "macd_fast must be less than macd_slow".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_rsi_thresholds(&self) -> Result<(), TraderError> {
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
        {
            return Err(invalid(
                "rsi_oversold",
                "RSI thresholds must be between 0 and 100".to_string(),
            ));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(invalid(
                "rsi_oversold",
                "rsi_oversold must be below rsi_overbought".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_bollinger(&self) -> Result<(), TraderError> {
        if self.bollinger_deviation <= 0.0 {
            return Err(invalid(
                "bollinger_deviation",
                "bollinger_deviation must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_distances(&self) -> Result<(), TraderError> {
        if self.stop_loss_distance <= 0.0 {
            return Err(invalid(
                "stop_loss_distance",
                "stop_loss_distance must be positive".to_string(),
            ));
        }
        if self.take_profit_distance <= 0.0 {
            return Err(invalid(
                "take_profit_distance",
                "take_profit_distance must be positive".to_string(),
            ));
        }
        if self.price_increment <= 0.0 {
            return Err(invalid(
                "price_increment",
                "price_increment must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_sizing(&self) -> Result<(), TraderError> {
        if self.lot_size <= 0.0 {
            return Err(invalid("lot_size", "lot_size must be positive".to_string()));
        }
        if self.slippage_tolerance < 0.0 {
            return Err(invalid(
                "slippage_tolerance",
                "slippage_tolerance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_cadence(&self) -> Result<(), TraderError> {
        if self.poll_interval_secs == 0 {
            return Err(TraderError::ConfigInvalid {
                section: "trading".to_string(),
                key: "poll_interval".to_string(),
                reason: "poll_interval must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: String) -> TraderError {
    TraderError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason,
    }
}

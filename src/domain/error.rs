//! Domain error types.

/// Top-level error type for pulsetrader.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient data: have {have} bars, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("bad bar data: {reason}")]
    BarData { reason: String },

    #[error("order builder invoked with a HOLD signal")]
    InvalidSignal,

    #[error("a position is already open for {symbol}")]
    PositionAlreadyOpen { symbol: String },

    #[error("order rejected for {symbol} (broker code {code})")]
    OrderRejected { symbol: String, code: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::BarData { .. } => 3,
            TraderError::InvalidSignal | TraderError::PositionAlreadyOpen { .. } => 4,
            TraderError::InsufficientData { .. }
            | TraderError::DataUnavailable { .. }
            | TraderError::OrderRejected { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = TraderError::InsufficientData { have: 10, need: 34 };
        assert_eq!(err.to_string(), "insufficient data: have 10 bars, need 34");
    }

    #[test]
    fn config_invalid_message() {
        let err = TraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "rsi_period".into(),
            reason: "rsi_period must be at least 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] rsi_period: rsi_period must be at least 1"
        );
    }

    #[test]
    fn order_rejected_message() {
        let err = TraderError::OrderRejected {
            symbol: "VIX".into(),
            code: 10019,
        };
        assert_eq!(err.to_string(), "order rejected for VIX (broker code 10019)");
    }
}

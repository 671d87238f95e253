//! Moving Average Convergence Divergence.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded with a simple mean
//! Histogram = MACD Line - Signal Line
//!
//! Warmup: (slow - 1) + (signal - 1) bars.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{ema::calculate_ema, IndicatorPoint, IndicatorValue};

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<IndicatorPoint> {
    if bars.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return Vec::new();
    }

    let ema_fast = ema_raw_values(bars, fast);
    let ema_slow = ema_raw_values(bars, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let k = 2.0 / (signal_period as f64 + 1.0);
    let mut signal_line: Vec<f64> = vec![0.0; bars.len()];
    let macd_warmup = slow - 1;

    if macd_warmup + signal_period <= bars.len() {
        let seed: f64 = macd_line[macd_warmup..macd_warmup + signal_period]
            .iter()
            .sum::<f64>()
            / signal_period as f64;

        let mut signal_ema = seed;
        signal_line[macd_warmup + signal_period - 1] = signal_ema;

        for i in (macd_warmup + signal_period)..bars.len() {
            signal_ema = macd_line[i] * k + signal_ema * (1.0 - k);
            signal_line[i] = signal_ema;
        }
    }

    let signal_warmup = slow - 1 + signal_period - 1;

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let line = macd_line[i];
            let signal = signal_line[i];
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: i >= signal_warmup,
                value: IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            }
        })
        .collect()
}

/// Raw f64 EMA series, 0.0 for warmup bars.
fn ema_raw_values(bars: &[PriceBar], period: usize) -> Vec<f64> {
    calculate_ema(bars, period)
        .iter()
        .map(|p| p.value.simple())
        .collect()
}

//! Bollinger Bands.
//!
//! Middle: Simple Moving Average over n periods
//! Upper/Lower: Middle ± deviation × StdDev
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) bars are invalid.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorValue};

pub fn calculate_bollinger(
    bars: &[PriceBar],
    period: usize,
    deviation: f64,
) -> Vec<IndicatorPoint> {
    if period == 0 {
        return bars
            .iter()
            .map(|b| IndicatorPoint {
                timestamp: b.timestamp,
                valid: false,
                value: IndicatorValue::Bollinger {
                    upper: 0.0,
                    middle: 0.0,
                    lower: 0.0,
                },
            })
            .collect();
    }

    let warmup = period - 1;
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let valid = i >= warmup;

        let (upper, middle, lower) = if valid {
            let window = &bars[i + 1 - period..=i];

            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;

            let stddev = variance.sqrt();
            (middle + deviation * stddev, middle, middle - deviation * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    values
}

//! Simple Moving Average of closing prices.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). The first (n-1) bars have no value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let warmup = period - 1;

    for (i, bar) in bars.iter().enumerate() {
        let value = if i >= warmup {
            let window = &bars[i - warmup..=i];
            let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            Some(IndicatorValue::Simple(mean))
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

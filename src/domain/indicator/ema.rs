//! Exponential Moving Average indicator.
//!
//! alpha = 2/(span+1), EMA[0] = C[0], then EMA[i] = alpha*C[i] + (1-alpha)*EMA[i-1].
//! Defined from the first bar; there is no warmup gap.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], span: usize) -> IndicatorSeries {
    if span == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = ema_values(&closes, span)
        .into_iter()
        .zip(bars)
        .map(|(ema, bar)| IndicatorPoint {
            date: bar.date,
            value: Some(IndicatorValue::Simple(ema)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

/// The EMA recurrence over an arbitrary value sequence. Span 0 yields nothing.
pub fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();

    if let Some(&first) = iter.next() {
        let mut ema = first;
        out.push(ema);
        for &v in iter {
            ema = alpha * v + (1.0 - alpha) * ema;
            out.push(ema);
        }
    }

    out
}

//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded with MACD[0]
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9. Every EMA is seeded with
//! the first value, so all points are defined.

use crate::domain::indicator::{
    ema_values, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// Raw MACD components aligned with the input bars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacdLines {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

pub fn macd_lines(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdLines {
    if fast == 0 || slow == 0 || signal_span == 0 {
        return MacdLines::default();
    }

    let ema_fast = ema_values(closes, fast);
    let ema_slow = ema_values(closes, slow);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_values(&macd, signal_span);

    MacdLines {
        ema_fast,
        ema_slow,
        macd,
        signal,
    }
}

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_span,
    };

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let lines = macd_lines(&closes, fast, slow, signal_span);

    let values = bars
        .iter()
        .zip(lines.macd.iter().zip(&lines.signal))
        .map(|(bar, (&line, &signal))| IndicatorPoint {
            date: bar.date,
            value: Some(IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            }),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses a trailing simple mean of gains and losses over the last n price
//! changes (no Wilder smoothing):
//! - gain[i] = max(C[i] - C[i-1], 0), loss[i] = max(C[i-1] - C[i], 0)
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - If avg_loss == 0: RSI = 100
//!
//! Warmup: bar 0 has no change and the first n changes fill the window, so the
//! first n bars have no value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return missing_series(bars, period);
    }

    // changes[k] is the move from bar k to bar k+1
    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for w in bars.windows(2) {
        let change = w[1].close - w[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let value = if i >= period {
            let window = i - period..i;
            let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
            let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
            Some(IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss)))
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

fn missing_series(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values: bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                value: None,
            })
            .collect(),
    }
}

/// Where an RSI reading sits relative to the overbought/oversold guide lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

pub const DEFAULT_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_OVERSOLD: f64 = 30.0;

impl RsiZone {
    pub fn classify(rsi: f64, overbought: f64, oversold: f64) -> Self {
        if rsi >= overbought {
            RsiZone::Overbought
        } else if rsi <= oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RsiZone::Overbought => "overbought",
            RsiZone::Neutral => "neutral",
            RsiZone::Oversold => "oversold",
        };
        f.write_str(label)
    }
}

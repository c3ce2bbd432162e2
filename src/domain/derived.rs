//! Derived series: the input bars plus the standard indicator set.

use crate::domain::indicator::macd::{macd_lines, DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::IndicatorType;
use crate::domain::ohlcv::{OhlcvBar, OhlcvSeries};
use serde::Serialize;

pub const SMA_FAST: usize = 20;
pub const SMA_SLOW: usize = 50;
pub const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedBar {
    #[serde(flatten)]
    pub bar: OhlcvBar,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi_14: Option<f64>,
    pub ema_12: f64,
    pub ema_26: f64,
    pub macd: f64,
    pub signal_line: f64,
    pub macd_histogram: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    pub symbol: String,
    pub bars: Vec<DerivedBar>,
}

impl DerivedSeries {
    /// Indicators with no defined value anywhere in this series because the
    /// series is shorter than their window.
    pub fn unavailable(&self) -> Vec<IndicatorType> {
        Self::indicator_set()
            .into_iter()
            .filter(|ind| self.bars.len() < ind.min_bars())
            .collect()
    }

    pub fn last(&self) -> Option<&DerivedBar> {
        self.bars.last()
    }

    fn indicator_set() -> [IndicatorType; 6] {
        [
            IndicatorType::Sma(SMA_FAST),
            IndicatorType::Sma(SMA_SLOW),
            IndicatorType::Rsi(RSI_PERIOD),
            IndicatorType::Ema(DEFAULT_FAST),
            IndicatorType::Ema(DEFAULT_SLOW),
            IndicatorType::Macd {
                fast: DEFAULT_FAST,
                slow: DEFAULT_SLOW,
                signal: DEFAULT_SIGNAL,
            },
        ]
    }
}

/// SMA(20), SMA(50), RSI(14), EMA(12), EMA(26), MACD(12,26,9) for every bar.
pub fn compute_indicators(series: &OhlcvSeries) -> DerivedSeries {
    let bars = series.bars();

    let sma_20 = calculate_sma(bars, SMA_FAST).simple_values();
    let sma_50 = calculate_sma(bars, SMA_SLOW).simple_values();
    let rsi_14 = calculate_rsi(bars, RSI_PERIOD).simple_values();
    let lines = macd_lines(&series.closes(), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);

    let derived = bars
        .iter()
        .zip(sma_20.into_iter().zip(sma_50).zip(rsi_14))
        .zip(
            lines
                .ema_fast
                .iter()
                .zip(&lines.ema_slow)
                .zip(lines.macd.iter().zip(&lines.signal)),
        )
        .map(
            |((bar, ((sma_20, sma_50), rsi_14)), ((&ema_12, &ema_26), (&macd, &signal)))| {
                DerivedBar {
                    bar: bar.clone(),
                    sma_20,
                    sma_50,
                    rsi_14,
                    ema_12,
                    ema_26,
                    macd,
                    signal_line: signal,
                    macd_histogram: macd - signal,
                }
            },
        )
        .collect();

    DerivedSeries {
        symbol: series.symbol().to_string(),
        bars: derived,
    }
}

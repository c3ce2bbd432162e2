//! Risk/return statistics over a single series.

use crate::domain::error::AnalyticsError;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::returns::{pct_change, ratio_change, sample_stddev};
use serde::Serialize;

/// Applied to every interval, including weekly and monthly bars.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub const MIN_SUMMARY_BARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub symbol: String,
    pub bars: usize,
    pub last_price: f64,
    pub price_change: f64,
    pub price_change_pct: Option<f64>,
    pub total_return_pct: Option<f64>,
    pub annualized_volatility_pct: Option<f64>,
}

/// Periodic close-to-close returns, aligned with the bars; index 0 is `None`.
pub fn compute_returns(series: &OhlcvSeries) -> Vec<Option<f64>> {
    pct_change(&series.closes())
}

pub fn compute_summary(series: &OhlcvSeries) -> Result<Summary, AnalyticsError> {
    let bars = series.bars();
    if bars.len() < MIN_SUMMARY_BARS {
        return Err(AnalyticsError::InsufficientData {
            symbol: series.symbol().to_string(),
            bars: bars.len(),
            minimum: MIN_SUMMARY_BARS,
        });
    }

    let first = bars[0].close;
    let prev = bars[bars.len() - 2].close;
    let last = bars[bars.len() - 1].close;

    Ok(Summary {
        symbol: series.symbol().to_string(),
        bars: bars.len(),
        last_price: last,
        price_change: last - prev,
        price_change_pct: ratio_change(prev, last).map(|r| r * 100.0),
        total_return_pct: ratio_change(first, last).map(|r| r * 100.0),
        annualized_volatility_pct: annualized_volatility_pct(&compute_returns(series)),
    })
}

/// stdev(r) * sqrt(252) * 100 over the defined returns.
pub fn annualized_volatility_pct(returns: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = returns.iter().flatten().copied().collect();
    sample_stddev(&defined).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

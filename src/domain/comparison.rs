//! Rebased price comparison: every close divided by the first close, times 100.

use crate::domain::ohlcv::OhlcvSeries;
use chrono::NaiveDate;
use serde::Serialize;

pub const REBASE_BASE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RebasedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebasedSeries {
    pub symbol: String,
    pub points: Vec<RebasedPoint>,
}

/// Empty when the series is empty or its first close is zero.
pub fn rebase(series: &OhlcvSeries) -> Vec<RebasedPoint> {
    let Some(first) = series.bars().first() else {
        return Vec::new();
    };
    if first.close == 0.0 {
        return Vec::new();
    }

    series
        .bars()
        .iter()
        .map(|bar| RebasedPoint {
            date: bar.date,
            value: bar.close / first.close * REBASE_BASE,
        })
        .collect()
}

pub fn compare(series: &[&OhlcvSeries]) -> Vec<RebasedSeries> {
    series
        .iter()
        .map(|s| RebasedSeries {
            symbol: s.symbol().to_string(),
            points: rebase(s),
        })
        .collect()
}

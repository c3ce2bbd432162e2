//! OHLCV bar and series representation.

use crate::domain::error::AnalyticsError;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// An immutable, chronologically ordered series of bars for one symbol.
///
/// Construction checks that dates are strictly ascending and that every field
/// is finite, so engines can rely on both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl OhlcvSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, AnalyticsError> {
        let symbol = symbol.into();

        if let Some(bar) = bars.iter().find(|b| !b.is_finite()) {
            return Err(AnalyticsError::InvalidSeries {
                symbol,
                reason: format!("non-finite value in bar dated {}", bar.date),
            });
        }

        if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(AnalyticsError::InvalidSeries {
                symbol,
                reason: format!("bar dated {} does not follow {}", w[1].date, w[0].date),
            });
        }

        Ok(Self { symbol, bars })
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

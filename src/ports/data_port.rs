//! Series provider port trait.

use crate::domain::error::AnalyticsError;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::OhlcvSeries;
use chrono::NaiveDate;

/// Source of OHLCV series. Failures are reported as
/// [`AnalyticsError::DataUnavailable`].
pub trait SeriesProvider {
    /// Bars for `symbol` dated within `start..=end`, at `interval`.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<OhlcvSeries, AnalyticsError>;

    fn list_symbols(&self) -> Result<Vec<String>, AnalyticsError>;
}

//! CSV file series provider.
//!
//! One file of daily bars per symbol, `<base>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume`.

use crate::domain::error::AnalyticsError;
use crate::domain::interval::{resample, Interval};
use crate::domain::ohlcv::{OhlcvBar, OhlcvSeries};
use crate::ports::data_port::SeriesProvider;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvRecord> for OhlcvBar {
    fn from(r: CsvRecord) -> Self {
        OhlcvBar {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        }
    }
}

pub struct CsvSeriesProvider {
    base_path: PathBuf,
}

impl CsvSeriesProvider {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn unavailable(symbol: &str, reason: String) -> AnalyticsError {
        AnalyticsError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        }
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, AnalyticsError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            Self::unavailable(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut bars = Vec::new();
        for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
            let record = result.map_err(|e| {
                Self::unavailable(symbol, format!("CSV parse error in row {}: {}", row + 1, e))
            })?;
            bars.push(OhlcvBar::from(record));
        }
        Ok(bars)
    }
}

/// Sort by date and keep the last bar seen for any repeated date.
fn dedup_by_date(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    // stable sort keeps file order among equal dates
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

impl SeriesProvider for CsvSeriesProvider {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<OhlcvSeries, AnalyticsError> {
        let raw = self.read_bars(symbol)?;
        let total = raw.len();

        let in_range: Vec<OhlcvBar> = raw
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        let daily = dedup_by_date(in_range);
        if daily.is_empty() {
            warn!(symbol, %start, %end, "no bars in requested range");
        }

        let bars = resample(&daily, interval);
        debug!(
            symbol,
            rows = total,
            bars = bars.len(),
            %interval,
            "loaded series from CSV"
        );

        OhlcvSeries::new(symbol, bars).map_err(|e| Self::unavailable(symbol, e.to_string()))
    }

    fn list_symbols(&self) -> Result<Vec<String>, AnalyticsError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            Self::unavailable(
                "*",
                format!(
                    "failed to read directory {}: {}",
                    self.base_path.display(),
                    e
                ),
            )
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| Self::unavailable("*", format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

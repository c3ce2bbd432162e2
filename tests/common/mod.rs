#![allow(dead_code)]

use chrono::NaiveDate;
use marketlens::domain::error::AnalyticsError;
use marketlens::domain::interval::{resample, Interval};
pub use marketlens::domain::ohlcv::{OhlcvBar, OhlcvSeries};
use marketlens::domain::settings::AnalysisConfig;
use marketlens::ports::data_port::SeriesProvider;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory provider. Bars are filtered by date and resampled like the CSV
/// provider does.
pub struct MockProvider {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SeriesProvider for MockProvider {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<OhlcvSeries, AnalyticsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(AnalyticsError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).ok_or_else(|| AnalyticsError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "unknown symbol".to_string(),
        })?;
        let in_range: Vec<OhlcvBar> = bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        OhlcvSeries::new(symbol, resample(&in_range, interval))
    }

    fn list_symbols(&self) -> Result<Vec<String>, AnalyticsError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// Consecutive calendar-day bars with the given closes.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0 + i as f64,
        })
        .collect()
}

pub fn series_from_closes(symbol: &str, closes: &[f64]) -> OhlcvSeries {
    OhlcvSeries::new(symbol, bars_from_closes("2024-01-01", closes)).unwrap()
}

/// Deterministic wavy price path.
pub fn generate_closes(count: usize, start_price: f64, phase: f64) -> Vec<f64> {
    (0..count)
        .map(|i| start_price + i as f64 * 0.2 + ((i as f64 + phase) * 0.45).sin() * 3.0)
        .collect()
}

pub fn sample_settings() -> AnalysisConfig {
    AnalysisConfig {
        data_path: PathBuf::from("/unused"),
        start_date: date(2020, 1, 1),
        end_date: date(2024, 12, 31),
        interval: Interval::Daily,
        symbols: Vec::new(),
        rsi_overbought: 70.0,
        rsi_oversold: 30.0,
    }
}

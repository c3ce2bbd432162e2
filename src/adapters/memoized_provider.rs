//! Request-scoped memoization over any [`SeriesProvider`].

use crate::domain::error::AnalyticsError;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::OhlcvSeries;
use crate::ports::data_port::SeriesProvider;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

type CacheKey = (String, NaiveDate, NaiveDate, Interval);

/// Failures are kept as their reason so a repeated request fails the same way
/// without another round trip.
type CacheEntry = Result<OhlcvSeries, String>;

/// Fetches each distinct `(symbol, start, end, interval)` at most once.
///
/// The lock is held across the inner fetch, so concurrent callers asking for
/// the same key wait for the first one instead of fetching again. Fetches for
/// unrelated keys are serialized by the same lock.
pub struct MemoizedProvider<P> {
    inner: P,
    cache: Mutex<HashMap<CacheKey, CacheEntry>>,
    fetches: AtomicUsize,
}

impl<P: SeriesProvider> MemoizedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of fetches forwarded to the wrapped provider.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: SeriesProvider> SeriesProvider for MemoizedProvider<P> {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<OhlcvSeries, AnalyticsError> {
        let key = (symbol.to_string(), start, end, interval);
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        let entry = match cache.get(&key) {
            Some(hit) => {
                debug!(symbol, %interval, "series cache hit");
                hit.clone()
            }
            None => {
                self.fetches.fetch_add(1, Ordering::SeqCst);
                let fetched = self.inner.fetch(symbol, start, end, interval).map_err(|e| match e {
                    AnalyticsError::DataUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                });
                cache.insert(key, fetched.clone());
                fetched
            }
        };

        entry.map_err(|reason| AnalyticsError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        })
    }

    fn list_symbols(&self) -> Result<Vec<String>, AnalyticsError> {
        self.inner.list_symbols()
    }
}

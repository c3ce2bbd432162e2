//! Bar intervals and resampling of daily bars into weekly or monthly bars.

use crate::domain::ohlcv::OhlcvBar;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    pub fn code(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    /// Key shared by every date that falls in the same bucket.
    fn bucket(self, date: NaiveDate) -> (i32, u32) {
        match self {
            Interval::Daily => (date.year(), date.ordinal()),
            Interval::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Interval::Monthly => (date.year(), date.month()),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "daily" => Ok(Interval::Daily),
            "1wk" | "weekly" => Ok(Interval::Weekly),
            "1mo" | "monthly" => Ok(Interval::Monthly),
            other => Err(format!(
                "unknown interval '{other}' (expected 1d, 1wk or 1mo)"
            )),
        }
    }
}

/// Aggregate date-sorted daily bars into `interval` buckets.
///
/// A bucket keeps the first bar's date and open, the highest high, the lowest
/// low, the last close and the summed volume. Daily input is returned as is.
pub fn resample(bars: &[OhlcvBar], interval: Interval) -> Vec<OhlcvBar> {
    if interval == Interval::Daily {
        return bars.to_vec();
    }

    let mut aggregated = Vec::new();
    let mut current: Option<((i32, u32), OhlcvBar)> = None;

    for bar in bars {
        let key = interval.bucket(bar.date);
        if let Some((bucket, agg)) = current.as_mut() {
            if *bucket == key {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
                continue;
            }
        }
        if let Some((_, done)) = current.replace((key, bar.clone())) {
            aggregated.push(done);
        }
    }

    if let Some((_, done)) = current {
        aggregated.push(done);
    }

    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open,
            high,
            low,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn parse_interval_codes() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::Daily);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!("1mo".parse::<Interval>().unwrap(), Interval::Monthly);
        assert_eq!(" Weekly ".parse::<Interval>().unwrap(), Interval::Weekly);
        assert!("1h".parse::<Interval>().is_err());
        assert!("".parse::<Interval>().is_err());
    }

    #[test]
    fn display_round_trips_code() {
        for interval in [Interval::Daily, Interval::Weekly, Interval::Monthly] {
            assert_eq!(interval.to_string().parse::<Interval>().unwrap(), interval);
        }
        assert_eq!(Interval::default(), Interval::Daily);
    }

    #[test]
    fn daily_is_unchanged() {
        let bars = vec![bar(2024, 1, 2, 1.0, 2.0, 0.5, 1.5), bar(2024, 1, 3, 1.5, 2.5, 1.0, 2.0)];
        assert_eq!(resample(&bars, Interval::Daily), bars);
    }

    #[test]
    fn weekly_buckets_by_iso_week() {
        // 2024-01-05 is a Friday; 2024-01-08 starts the next ISO week
        let bars = vec![
            bar(2024, 1, 3, 10.0, 12.0, 9.0, 11.0),
            bar(2024, 1, 4, 11.0, 15.0, 10.0, 14.0),
            bar(2024, 1, 5, 14.0, 14.5, 8.0, 9.5),
            bar(2024, 1, 8, 9.5, 10.0, 9.0, 9.8),
        ];
        let weekly = resample(&bars, Interval::Weekly);

        assert_eq!(weekly.len(), 2);
        let first = &weekly[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(first.open, 10.0);
        assert_eq!(first.high, 15.0);
        assert_eq!(first.low, 8.0);
        assert_eq!(first.close, 9.5);
        assert_eq!(first.volume, 30.0);
        assert_eq!(weekly[1].date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(weekly[1].volume, 10.0);
    }

    #[test]
    fn weekly_spans_year_boundary() {
        // 2024-12-30 and 2025-01-02 share ISO week 1 of 2025
        let bars = vec![
            bar(2024, 12, 30, 1.0, 1.0, 1.0, 1.0),
            bar(2025, 1, 2, 2.0, 2.0, 2.0, 2.0),
        ];
        let weekly = resample(&bars, Interval::Weekly);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].close, 2.0);
    }

    #[test]
    fn monthly_buckets_by_calendar_month() {
        let bars = vec![
            bar(2024, 1, 30, 1.0, 3.0, 0.5, 2.0),
            bar(2024, 1, 31, 2.0, 4.0, 1.5, 3.0),
            bar(2024, 2, 1, 3.0, 3.5, 2.5, 3.2),
            bar(2025, 2, 3, 5.0, 5.0, 5.0, 5.0),
        ];
        let monthly = resample(&bars, Interval::Monthly);

        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly[0].high, 4.0);
        assert_eq!(monthly[0].low, 0.5);
        assert_eq!(monthly[0].close, 3.0);
        assert_eq!(monthly[0].volume, 20.0);
        assert_eq!(monthly[1].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(monthly[2].date, NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
    }

    #[test]
    fn resample_empty() {
        assert!(resample(&[], Interval::Monthly).is_empty());
    }
}

//! Pairwise Pearson correlation of close-to-close returns.
//!
//! Returns are computed per symbol on its own bars, then each pair is aligned
//! on the dates both series share. A coefficient is `None` when either series
//! has fewer than two bars, when fewer than two aligned observations remain or
//! when either side has zero variance.

use crate::domain::error::AnalyticsError;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::returns::mean;
use crate::domain::risk::compute_returns;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Coefficient for a symbol pair; `None` if either symbol is unknown or
    /// the coefficient is undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.values[i][j]
    }
}

pub fn correlate(series: &[&OhlcvSeries]) -> Result<CorrelationMatrix, AnalyticsError> {
    if series.len() < 2 {
        return Ok(CorrelationMatrix::default());
    }

    let mut seen = HashSet::new();
    for s in series {
        if !seen.insert(s.symbol()) {
            return Err(AnalyticsError::InputMismatch {
                reason: format!("symbol {} supplied more than once", s.symbol()),
            });
        }
    }

    let dated_returns: Vec<BTreeMap<NaiveDate, Option<f64>>> = series
        .iter()
        .map(|s| {
            s.bars()
                .iter()
                .map(|b| b.date)
                .zip(compute_returns(s))
                .collect()
        })
        .collect();

    let n = series.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            if series[i].len() < 2 || series[j].len() < 2 {
                continue;
            }
            let (xs, ys) = align(&dated_returns[i], &dated_returns[j]).ok_or_else(|| {
                AnalyticsError::InputMismatch {
                    reason: format!(
                        "{} and {} share no dates",
                        series[i].symbol(),
                        series[j].symbol()
                    ),
                }
            })?;
            let coefficient = pearson(&xs, &ys);
            values[i][j] = coefficient;
            values[j][i] = coefficient;
        }
    }

    Ok(CorrelationMatrix {
        symbols: series.iter().map(|s| s.symbol().to_string()).collect(),
        values,
    })
}

/// Paired returns on shared dates where both are defined. `None` when the two
/// series have no date in common.
fn align(
    a: &BTreeMap<NaiveDate, Option<f64>>,
    b: &BTreeMap<NaiveDate, Option<f64>>,
) -> Option<(Vec<f64>, Vec<f64>)> {
    let mut shared_dates = false;
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for (date, ra) in a {
        if let Some(rb) = b.get(date) {
            shared_dates = true;
            if let (Some(x), Some(y)) = (ra, rb) {
                xs.push(*x);
                ys.push(*y);
            }
        }
    }

    shared_dates.then_some((xs, ys))
}

pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

//! Weighted multi-asset portfolio aggregation.

use crate::domain::error::AnalyticsError;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::returns::ratio_change;
use chrono::NaiveDate;
use serde::Serialize;

pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedAsset {
    pub symbol: String,
    pub weight: f64,
}

impl WeightedAsset {
    pub fn new(symbol: impl Into<String>, weight: f64) -> Self {
        Self {
            symbol: symbol.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioResult {
    pub blended: Vec<BlendedPoint>,
    pub portfolio_return_pct: Option<f64>,
}

/// Every weight finite and the total within `tolerance` of 1.0.
pub fn validate_weights(weights: &[f64], tolerance: f64) -> Result<(), AnalyticsError> {
    let sum: f64 = weights.iter().sum();
    let all_finite = weights.iter().all(|w| w.is_finite());
    if !all_finite || (sum - 1.0).abs() > tolerance {
        return Err(AnalyticsError::InvalidWeights { sum, tolerance });
    }
    Ok(())
}

/// Rescale non-negative weights so they sum to 1.
pub fn normalize_weights(assets: &[WeightedAsset]) -> Result<Vec<WeightedAsset>, AnalyticsError> {
    let sum: f64 = assets.iter().map(|a| a.weight).sum();
    let valid = assets.iter().all(|a| a.weight.is_finite() && a.weight >= 0.0);
    if !valid || sum <= 0.0 || !sum.is_finite() {
        return Err(AnalyticsError::InvalidWeights {
            sum,
            tolerance: 0.0,
        });
    }

    Ok(assets
        .iter()
        .map(|a| WeightedAsset::new(a.symbol.clone(), a.weight / sum))
        .collect())
}

/// Blend aligned close series: blended[i] = sum(weight * close[i]).
///
/// Weights are validated before anything else. All series must share the same
/// length and the same date at every index; nothing is truncated.
pub fn aggregate(
    holdings: &[(&OhlcvSeries, f64)],
    tolerance: f64,
) -> Result<PortfolioResult, AnalyticsError> {
    let weights: Vec<f64> = holdings.iter().map(|(_, w)| *w).collect();
    validate_weights(&weights, tolerance)?;

    let Some(&(reference, _)) = holdings.first() else {
        return Err(AnalyticsError::InvalidWeights {
            sum: 0.0,
            tolerance,
        });
    };
    for (series, _) in &holdings[1..] {
        check_aligned(reference, series)?;
    }

    let blended: Vec<BlendedPoint> = reference
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| BlendedPoint {
            date: bar.date,
            value: holdings
                .iter()
                .map(|(series, weight)| weight * series.bars()[i].close)
                .sum(),
        })
        .collect();

    let portfolio_return_pct = match (blended.first(), blended.last()) {
        (Some(first), Some(last)) if blended.len() >= 2 => {
            ratio_change(first.value, last.value).map(|r| r * 100.0)
        }
        _ => None,
    };

    Ok(PortfolioResult {
        blended,
        portfolio_return_pct,
    })
}

fn check_aligned(reference: &OhlcvSeries, other: &OhlcvSeries) -> Result<(), AnalyticsError> {
    if reference.len() != other.len() {
        return Err(AnalyticsError::InputMismatch {
            reason: format!(
                "{} has {} bars but {} has {}",
                reference.symbol(),
                reference.len(),
                other.symbol(),
                other.len()
            ),
        });
    }

    let misaligned = reference
        .bars()
        .iter()
        .zip(other.bars())
        .find(|(a, b)| a.date != b.date);
    if let Some((a, b)) = misaligned {
        return Err(AnalyticsError::InputMismatch {
            reason: format!(
                "{} bar dated {} lines up with {} bar dated {}",
                reference.symbol(),
                a.date,
                other.symbol(),
                b.date
            ),
        });
    }

    Ok(())
}

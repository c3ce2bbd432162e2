//! Typed analysis and portfolio settings built from configuration.
//!
//! Symbol and asset lists are parsed here; command-line overrides are applied
//! on top of the values read from the INI file.

use crate::domain::config_validation::{
    non_blank, parse_date, read_f64, validate_analysis_config, validate_portfolio_config,
};
use crate::domain::error::AnalyticsError;
use crate::domain::indicator::rsi::{DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};
use crate::domain::interval::Interval;
use crate::domain::portfolio::{WeightedAsset, DEFAULT_WEIGHT_TOLERANCE};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListError {
    #[error("empty token in list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("expected SYMBOL:WEIGHT, got '{0}'")]
    MalformedAsset(String),

    #[error("invalid weight for {symbol}: '{value}'")]
    InvalidWeight { symbol: String, value: String },
}

/// Comma-separated symbols, trimmed and uppercased.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, ListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(ListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Comma-separated `SYMBOL:WEIGHT` pairs. Weights are only parsed here; their
/// sum is checked by the aggregator.
pub fn parse_assets(input: &str) -> Result<Vec<WeightedAsset>, ListError> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ListError::EmptyToken);
        }
        let Some((symbol, weight)) = trimmed.split_once(':') else {
            return Err(ListError::MalformedAsset(trimmed.to_string()));
        };
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ListError::MalformedAsset(trimmed.to_string()));
        }
        let weight = weight
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|w| w.is_finite())
            .ok_or_else(|| ListError::InvalidWeight {
                symbol: symbol.clone(),
                value: weight.trim().to_string(),
            })?;
        if !seen.insert(symbol.clone()) {
            return Err(ListError::DuplicateSymbol(symbol));
        }
        assets.push(WeightedAsset::new(symbol, weight));
    }

    Ok(assets)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub interval: Interval,
    pub symbols: Vec<String>,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl AnalysisConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AnalyticsError> {
        validate_analysis_config(config)?;

        let data_path = non_blank(config, "data", "path").map(PathBuf::from).ok_or_else(|| {
            AnalyticsError::ConfigMissing {
                section: "data".to_string(),
                key: "path".to_string(),
            }
        })?;
        let start_date = Self::date(config, "start_date")?;
        let end_date = Self::date(config, "end_date")?;
        let interval = match non_blank(config, "analysis", "interval") {
            Some(s) => s.parse::<Interval>().map_err(|reason| AnalyticsError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "interval".to_string(),
                reason,
            })?,
            None => Interval::Daily,
        };
        let symbols = match non_blank(config, "analysis", "symbols") {
            Some(s) => parse_symbols(&s).map_err(|e| AnalyticsError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "symbols".to_string(),
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            data_path,
            start_date,
            end_date,
            interval,
            symbols,
            rsi_overbought: read_f64(config, "indicators", "rsi_overbought", DEFAULT_OVERBOUGHT)?,
            rsi_oversold: read_f64(config, "indicators", "rsi_oversold", DEFAULT_OVERSOLD)?,
        })
    }

    fn date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, AnalyticsError> {
        let value = non_blank(config, "analysis", key).ok_or_else(|| AnalyticsError::ConfigMissing {
            section: "analysis".to_string(),
            key: key.to_string(),
        })?;
        parse_date(&value, "analysis", key)
    }

    /// Replace dates and interval with command-line values, re-checking the
    /// date order afterwards.
    pub fn apply_overrides(
        &mut self,
        start: Option<&str>,
        end: Option<&str>,
        interval: Option<&str>,
    ) -> Result<(), AnalyticsError> {
        if let Some(s) = start {
            self.start_date = parse_date(s, "analysis", "start_date")?;
        }
        if let Some(s) = end {
            self.end_date = parse_date(s, "analysis", "end_date")?;
        }
        if let Some(s) = interval {
            self.interval = s.parse::<Interval>().map_err(|reason| AnalyticsError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "interval".to_string(),
                reason,
            })?;
        }
        if self.start_date >= self.end_date {
            return Err(AnalyticsError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioConfig {
    pub assets: Vec<WeightedAsset>,
    pub weight_tolerance: f64,
    pub normalize: bool,
}

impl PortfolioConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AnalyticsError> {
        validate_portfolio_config(config)?;

        let assets = match non_blank(config, "portfolio", "assets") {
            Some(s) => parse_assets(&s).map_err(|e| AnalyticsError::ConfigInvalid {
                section: "portfolio".to_string(),
                key: "assets".to_string(),
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            assets,
            weight_tolerance: read_f64(
                config,
                "portfolio",
                "weight_tolerance",
                DEFAULT_WEIGHT_TOLERANCE,
            )?,
            normalize: config.get_bool("portfolio", "normalize", false),
        })
    }
}

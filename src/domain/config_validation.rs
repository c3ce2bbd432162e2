//! Configuration validation.
//!
//! Validates every config field before any series is fetched.

use crate::domain::error::AnalyticsError;
use crate::domain::interval::Interval;
use crate::domain::settings::{parse_assets, parse_symbols};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    validate_data_path(config)?;
    validate_dates(config)?;
    validate_interval(config)?;
    validate_symbols(config)?;
    validate_rsi_thresholds(config)?;
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    validate_assets(config)?;
    validate_weight_tolerance(config)?;
    validate_normalize(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AnalyticsError {
    AnalyticsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Present-but-blank values count as absent.
pub(crate) fn non_blank(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A float that falls back to `default` when absent but is rejected when
/// present and unparseable.
pub(crate) fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, AnalyticsError> {
    match non_blank(config, section, key) {
        None => Ok(default),
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(invalid(section, key, format!("'{s}' is not a number"))),
        },
    }
}

pub(crate) fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| invalid(section, key, format!("invalid {key} format, expected YYYY-MM-DD")))
}

fn required_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, AnalyticsError> {
    match non_blank(config, "analysis", key) {
        None => Err(AnalyticsError::ConfigMissing {
            section: "analysis".to_string(),
            key: key.to_string(),
        }),
        Some(s) => parse_date(&s, "analysis", key),
    }
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    match non_blank(config, "data", "path") {
        Some(_) => Ok(()),
        None => Err(AnalyticsError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    let start_date = required_date(config, "start_date")?;
    let end_date = required_date(config, "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "analysis",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn validate_interval(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    if let Some(s) = non_blank(config, "analysis", "interval") {
        s.parse::<Interval>()
            .map_err(|reason| invalid("analysis", "interval", reason))?;
    }
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    if let Some(s) = non_blank(config, "analysis", "symbols") {
        parse_symbols(&s).map_err(|e| invalid("analysis", "symbols", e.to_string()))?;
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    use crate::domain::indicator::rsi::{DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};

    let overbought = read_f64(config, "indicators", "rsi_overbought", DEFAULT_OVERBOUGHT)?;
    let oversold = read_f64(config, "indicators", "rsi_oversold", DEFAULT_OVERSOLD)?;

    if overbought <= 0.0 || overbought >= 100.0 {
        return Err(invalid(
            "indicators",
            "rsi_overbought",
            "rsi_overbought must be between 0 and 100",
        ));
    }
    if oversold <= 0.0 || oversold >= overbought {
        return Err(invalid(
            "indicators",
            "rsi_oversold",
            "rsi_oversold must be positive and below rsi_overbought",
        ));
    }
    Ok(())
}

fn validate_assets(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    if let Some(s) = non_blank(config, "portfolio", "assets") {
        parse_assets(&s).map_err(|e| invalid("portfolio", "assets", e.to_string()))?;
    }
    Ok(())
}

fn validate_weight_tolerance(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    use crate::domain::portfolio::DEFAULT_WEIGHT_TOLERANCE;

    let value = read_f64(config, "portfolio", "weight_tolerance", DEFAULT_WEIGHT_TOLERANCE)?;
    if value <= 0.0 || value >= 1.0 {
        return Err(invalid(
            "portfolio",
            "weight_tolerance",
            "weight_tolerance must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_normalize(config: &dyn ConfigPort) -> Result<(), AnalyticsError> {
    if let Some(s) = non_blank(config, "portfolio", "normalize") {
        let known = matches!(
            s.to_lowercase().as_str(),
            "true" | "yes" | "1" | "false" | "no" | "0"
        );
        if !known {
            return Err(invalid(
                "portfolio",
                "normalize",
                format!("'{s}' is not a boolean"),
            ));
        }
    }
    Ok(())
}

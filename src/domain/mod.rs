//! Core domain types and analytics engines.

pub mod ohlcv;
pub mod interval;
pub mod returns;
pub mod indicator;
pub mod derived;
pub mod risk;
pub mod portfolio;
pub mod correlation;
pub mod comparison;
pub mod config_validation;
pub mod settings;
pub mod error;

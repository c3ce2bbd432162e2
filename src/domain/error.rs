//! Domain error types.

/// Top-level error type for marketlens.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid weights: sum is {sum}, expected 1.0 within {tolerance}")]
    InvalidWeights { sum: f64, tolerance: f64 },

    #[error("input mismatch: {reason}")]
    InputMismatch { reason: String },

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("invalid series {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyticsError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            AnalyticsError::Io(_) => 1,
            AnalyticsError::ConfigParse { .. }
            | AnalyticsError::ConfigMissing { .. }
            | AnalyticsError::ConfigInvalid { .. } => 2,
            AnalyticsError::DataUnavailable { .. } | AnalyticsError::InvalidSeries { .. } => 3,
            AnalyticsError::InvalidWeights { .. } | AnalyticsError::InputMismatch { .. } => 4,
            AnalyticsError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&AnalyticsError> for std::process::ExitCode {
    fn from(err: &AnalyticsError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = AnalyticsError::InsufficientData {
            symbol: "AAPL".into(),
            bars: 1,
            minimum: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for AAPL: have 1 bars, need 2"
        );
    }

    #[test]
    fn invalid_weights_message() {
        let err = AnalyticsError::InvalidWeights {
            sum: 0.9,
            tolerance: 1e-6,
        };
        assert!(err.to_string().starts_with("invalid weights: sum is 0.9"));
    }

    #[test]
    fn exit_status_by_category() {
        let mismatch = AnalyticsError::InputMismatch {
            reason: "lengths differ".into(),
        };
        let missing = AnalyticsError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        };
        let io = AnalyticsError::from(std::io::Error::other("disk"));
        let short = AnalyticsError::InsufficientData {
            symbol: "X".into(),
            bars: 0,
            minimum: 2,
        };
        assert_eq!(io.exit_status(), 1);
        assert_eq!(missing.exit_status(), 2);
        assert_eq!(mismatch.exit_status(), 4);
        assert_eq!(short.exit_status(), 5);
    }
}

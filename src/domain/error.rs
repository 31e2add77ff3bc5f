//! Domain error types.
//!
//! Only the orchestration layer (config loading, data access, notification)
//! returns these; the indicator, signal and risk layers are total.

/// Top-level error type for sigbench.
#[derive(Debug, thiserror::Error)]
pub enum SigbenchError {
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

    #[error("data access error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} at interval {interval}")]
    NoData { symbol: String, interval: String },

    #[error("invalid candle series at index {index}: {reason}")]
    InvalidSeries { index: usize, reason: String },

    #[error("insufficient history: have {bars} bars, need {minimum}")]
    InsufficientHistory { bars: usize, minimum: usize },

    #[error("notification failed: {reason}")]
    Notification { reason: String },

    #[error("prediction failed: {reason}")]
    Prediction { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigbenchError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SigbenchError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SigbenchError> for std::process::ExitCode {
    fn from(err: &SigbenchError) -> Self {
        let code: u8 = match err {
            SigbenchError::Io(_) => 1,
            SigbenchError::ConfigParse { .. }
            | SigbenchError::ConfigMissing { .. }
            | SigbenchError::ConfigInvalid { .. } => 2,
            SigbenchError::Data { .. } => 3,
            SigbenchError::NoData { .. }
            | SigbenchError::InvalidSeries { .. }
            | SigbenchError::InsufficientHistory { .. } => 5,
            SigbenchError::Notification { .. } | SigbenchError::Prediction { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

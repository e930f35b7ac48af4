//! Error types for the revenue-forecast library.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while reconciling and forecasting a metric.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A source adapter could not return data.
    #[error("source `{source_name}` failed: {message}")]
    SourceFetch {
        source_name: String,
        message: String,
    },

    /// Both inputs to a merge were empty.
    #[error("both input series are empty")]
    EmptySeries,

    /// Insufficient usable data points for fitting.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A single raw record could not be parsed.
    #[error("malformed record {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// Every record of a non-empty batch was malformed.
    #[error("all {total} records are malformed (first: {reason})")]
    MalformedRecords { total: usize, reason: String },

    /// Metric display name not present in the catalog.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// Invalid parameter value or violated series invariant.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numerical failure while fitting.
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse error category callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream data could not be fetched; retrying may help.
    Source,
    /// Input data was empty or too small to forecast.
    Data,
    /// Raw records could not be parsed.
    Malformed,
    /// Caller supplied an invalid request or configuration.
    Usage,
    /// The model failed numerically.
    Computation,
}

impl ForecastError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::SourceFetch { .. } => ErrorKind::Source,
            ForecastError::EmptySeries | ForecastError::InsufficientData { .. } => ErrorKind::Data,
            ForecastError::MalformedRecord { .. } | ForecastError::MalformedRecords { .. } => {
                ErrorKind::Malformed
            }
            ForecastError::UnknownMetric(_)
            | ForecastError::InvalidParameter(_)
            | ForecastError::Config(_) => ErrorKind::Usage,
            ForecastError::ComputationError(_) => ErrorKind::Computation,
        }
    }

    /// Whether the caller may reasonably retry the same request.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Source
    }

    pub(crate) fn source_fetch(source_name: &str, message: impl Into<String>) -> Self {
        ForecastError::SourceFetch {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}

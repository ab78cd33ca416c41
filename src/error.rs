//! Error types for the timeline pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Failure of a single call against the explorer API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Timeouts, rate limits, 5xx and connection failures; worth retrying
    #[error("transient API failure: {0}")]
    Transient(String),

    /// The endpoint answered but the answer is unusable
    #[error("permanent API failure: {0}")]
    Permanent(String),

    /// HTTP 404
    #[error("not found")]
    NotFound,
}

impl ApiError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            return ApiError::Transient(e.to_string());
        }
        match e.status() {
            Some(status) if status.as_u16() == 404 => ApiError::NotFound,
            Some(status) if status.is_server_error() || status.as_u16() == 429 => {
                ApiError::Transient(e.to_string())
            }
            _ if e.is_decode() || e.is_body() => ApiError::Permanent(e.to_string()),
            _ => ApiError::Transient(e.to_string()),
        }
    }
}

/// A transaction that resolved but cannot take part in the timeline.
/// These are counted and dropped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("transaction {hash} has no block height")]
    MissingBlockHeight { hash: String },

    #[error("transaction {hash} was not found")]
    NotFound { hash: String },

    #[error("transaction {hash} has a malformed detail payload: {reason}")]
    Malformed { hash: String, reason: String },
}

impl RecordError {
    pub fn hash(&self) -> &str {
        match self {
            RecordError::MissingBlockHeight { hash }
            | RecordError::NotFound { hash }
            | RecordError::Malformed { hash, .. } => hash,
        }
    }
}

/// Errors that fail a whole run
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The list endpoint stayed unusable after the retry budget
    #[error("failed to fetch transaction page {page}: {source}")]
    Pagination {
        page: usize,
        #[source]
        source: ApiError,
    },

    #[error("{failed} of {total} transactions could not be resolved (limit {max_ratio:.2})")]
    ResolutionFailureRate {
        failed: usize,
        total: usize,
        max_ratio: f64,
    },

    #[error("live balance unavailable: {0}")]
    CalibrationUnavailable(String),

    /// Running balance or calibration offset left the `Decimal` range
    #[error("running balance overflowed at transaction {hash}")]
    BalanceOverflow { hash: String },

    #[error("detail cache error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

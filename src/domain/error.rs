//! Domain error types.

/// Errors raised while parsing a `TICKER:weight` allocation list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("empty allocation list")]
    Empty,

    #[error("empty token in allocation list")]
    EmptyToken,

    #[error("malformed allocation entry {0:?} (expected TICKER:weight)")]
    Malformed(String),

    #[error("invalid weight for {ticker}: {value}")]
    InvalidWeight { ticker: String, value: String },

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("total weight {total} exceeds 1.0")]
    OverAllocated { total: f64 },
}

/// Top-level error type for rebalancer.
#[derive(Debug, thiserror::Error)]
pub enum RebalancerError {
    #[error("invalid input for {ticker}: {field} = {value}")]
    InvalidInput {
        ticker: String,
        field: &'static str,
        value: f64,
    },

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

    #[error("event data error: {reason}")]
    EventData { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RebalancerError {
    pub(crate) fn invalid_input(ticker: &str, field: &'static str, value: f64) -> Self {
        RebalancerError::InvalidInput {
            ticker: ticker.to_string(),
            field,
            value,
        }
    }
}

impl From<&RebalancerError> for std::process::ExitCode {
    fn from(err: &RebalancerError) -> Self {
        let code: u8 = match err {
            RebalancerError::Io(_) => 1,
            RebalancerError::ConfigParse { .. }
            | RebalancerError::ConfigMissing { .. }
            | RebalancerError::ConfigInvalid { .. } => 2,
            RebalancerError::EventData { .. } => 3,
            RebalancerError::InvalidInput { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

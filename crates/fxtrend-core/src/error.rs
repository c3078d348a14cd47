use thiserror::Error;

/// Validation and contract errors exposed by `fxtrend-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("currency must be a 3-letter ISO code: '{value}'")]
    InvalidCurrency { value: String },
    #[error("currency pair must contain two distinct codes, got '{code}' twice")]
    DuplicateCurrency { code: String },

    #[error("invalid period '{value}' days, expected one of 7, 14, 21, 28, 30, 60, 90, 180, 365")]
    InvalidPeriod { value: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp {value} is outside the representable range")]
    InvalidTimestamp { value: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be strictly positive")]
    NonPositiveValue { field: &'static str },

    #[error("series dates must be strictly increasing: {previous} is followed by {next}")]
    UnorderedSeries { previous: String, next: String },

    #[error("invalid provider '{value}', expected one of frankfurter, openerapi, fixture")]
    InvalidProvider { value: String },
    #[error("invalid value for {key}: '{value}'")]
    InvalidSetting { key: &'static str, value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

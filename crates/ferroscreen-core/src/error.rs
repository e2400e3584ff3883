use thiserror::Error;

/// Validation and contract errors exposed by `ferroscreen-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("ticker list cannot be empty")]
    EmptyTickerList,

    #[error("invalid strategy '{value}', expected one of plan1, plan2, plan3")]
    InvalidStrategy { value: String },

    #[error("threshold '{field}' must be finite")]
    NonFiniteThreshold { field: &'static str },
    #[error("threshold '{field}' must be non-negative, got {value}")]
    NegativeThreshold { field: &'static str, value: f64 },
    #[error("max_pe must be greater than zero, got {value}")]
    NonPositiveMaxPe { value: f64 },

    #[error("outlier factor must be >= 1.0, got {value}")]
    InvalidOutlierFactor { value: f64 },
    #[error("config value '{key}' is invalid: {reason}")]
    InvalidConfigValue { key: &'static str, reason: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

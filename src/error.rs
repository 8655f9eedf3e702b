//! Error types shared across the crate.

use thiserror::Error;

/// Drawing from a sampler whose pool holds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SamplerError {
    #[error("cannot draw from an empty pool")]
    EmptyPool,
}

#[derive(Debug, Error)]
pub enum WishError {
    #[error("wish text is empty")]
    EmptyText,
    #[error("failed to encode wishes: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage rejected write: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("malformed content pack: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("content pool `{kind}` is empty")]
    EmptyPool { kind: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed journey config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid journey config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

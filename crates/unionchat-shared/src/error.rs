use thiserror::Error;

/// Failure reported by a history source when a page cannot be fetched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("History source unavailable")]
    Unavailable,

    #[error("Malformed page: {0}")]
    Malformed(String),
}

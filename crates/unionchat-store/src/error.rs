use thiserror::Error;

use unionchat_shared::DeliveryState;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// `append` was given an id that is already in the transcript.
    #[error("Duplicate message id: {0}")]
    DuplicateId(String),

    /// No message with this id.
    #[error("Message not found: {0}")]
    NotFound(String),

    /// Delivery state would move backwards or out of `failed`.
    #[error("Invalid delivery transition: {from} -> {to}")]
    InvalidTransition {
        from: DeliveryState,
        to: DeliveryState,
    },

    /// Snapshot (de)serialization error.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Snapshot written by a newer format.
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

pub(crate) fn describe<T: std::fmt::Debug>(id: &T) -> String {
    format!("{id:?}")
}

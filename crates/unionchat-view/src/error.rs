use thiserror::Error;

use unionchat_shared::LoadError;

/// Errors from resolving a scroll target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrollError {
    /// The target message has no frame in the current layout. Retry after
    /// the next layout pass if the message is expected to appear.
    #[error("No layout for scroll target: {0}")]
    NotFound(String),
}

/// Errors surfaced when a history page comes back.
#[derive(Error, Debug)]
pub enum PaginationError {
    #[error("History load failed: {0}")]
    LoadFailure(#[from] LoadError),
}

/// Why the composer refused to produce a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Nothing to send")]
    Empty,

    /// The attachment needs an input source the configuration turned off.
    #[error("Attachment not allowed: {0}")]
    Unsupported(String),
}

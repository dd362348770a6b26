//! Error types for the OpenSearchServer client.

use thiserror::Error;

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, OssError>;

/// Errors raised by the client.
///
/// Request assembly itself never fails; errors only occur at the
/// transport seam (building the client, issuing the HTTP call, or a
/// non-success status from the engine).
#[derive(Error, Debug)]
pub enum OssError {
    /// Invalid argument passed to the client.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP transport failure (connection, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered with a non-success status.
    #[error("Engine returned {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl OssError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        OssError::InvalidArgument(message.into())
    }
}

//! Backend error types.

use thiserror::Error;

/// Errors that can occur when talking to the question-bank backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport error (connection refused, timeout, ...).
    #[cfg(feature = "network")]
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend returned a non-success status code.
    #[error("backend error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request was aborted because its context went away.
    #[error("request cancelled")]
    Cancelled,

    /// Reading the file to upload failed.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Built without the `network` feature.
    #[error("network support is disabled in this build")]
    Offline,
}

impl BackendError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BackendError::Cancelled)
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Malformed(err.to_string())
    }
}

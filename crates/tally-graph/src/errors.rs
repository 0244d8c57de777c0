//! Graph client errors.

use thiserror::Error;

/// Errors from talking to the Graph API.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Transport failure (connect, timeout, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status from the API.
    #[error("graph api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the Graph error envelope, or the raw body.
        message: String,
    },

    /// Comment pagination ran past the configured page limit.
    #[error("comment pagination exceeded {max_pages} pages")]
    PageLimit {
        /// Configured maximum.
        max_pages: u32,
    },
}

/// Convenience type alias for Graph results.
pub type Result<T> = std::result::Result<T, GraphError>;

//! API errors and their HTTP mapping.
//!
//! Input problems map to 400/404 with a specific message. Everything else is
//! a 500 with a generic message; the detail goes to the log only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tally_reconcile::ReconcileError;
use tally_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Error returned by a handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing input.
    #[error("{0}")]
    Validation(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reconciliation run failure.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl ApiError {
    /// Status code and client-facing message.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Reconcile(ReconcileError::ContestNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Contest not found".into())
            }
            Self::Reconcile(ReconcileError::MissingToken) => (
                StatusCode::BAD_REQUEST,
                "No Facebook access token found".into(),
            ),
            Self::Reconcile(ReconcileError::TokenExpired(_)) => (
                StatusCode::BAD_REQUEST,
                "Facebook access token has expired".into(),
            ),
            Self::Reconcile(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process comments".into(),
            ),
            Self::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Convenience type alias for handler results.
pub type Result<T> = std::result::Result<T, ApiError>;

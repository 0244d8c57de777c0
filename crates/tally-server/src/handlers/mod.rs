//! Route handlers and the helpers they share.

pub mod activity;
pub mod contests;
pub mod process;
pub mod tokens;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use tally_core::ActivityKind;
use tracing::warn;

use crate::errors::{ApiError, Result};
use crate::server::AppState;

/// Client address from proxy headers: `X-Real-IP`, else the first
/// `X-Forwarded-For` hop.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-real-ip")
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(String::from)
}

/// Append an activity row. Failures are logged and swallowed.
pub(crate) fn record_activity(
    state: &AppState,
    headers: &HeaderMap,
    kind: ActivityKind,
    message: &str,
    contest_id: Option<i64>,
) {
    let ip = client_ip(headers);
    if let Err(e) = state
        .store
        .log_activity(kind, message, contest_id, ip.as_deref())
    {
        warn!(kind = %kind, error = %e, "failed to record activity");
    }
}

/// Unwrap a JSON body, turning extractor rejections into 400s.
pub(crate) fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

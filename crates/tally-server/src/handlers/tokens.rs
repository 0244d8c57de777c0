//! Access token save and check.
//!
//! The token value is write-only: no response ever echoes it.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tally_core::ActivityKind;

use super::{json_body, non_blank, record_activity};
use crate::errors::{ApiError, Result};
use crate::server::AppState;

fn default_token_type() -> String {
    "page".into()
}

/// Body of `POST /api/auth/token`.
#[derive(Debug, Deserialize)]
pub struct SaveToken {
    /// Opaque Graph token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token kind.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// RFC 3339 expiry.
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Response of `GET /api/auth/token`.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TokenStatus {
    /// Whether any token is stored.
    pub exists: bool,
    /// Kind of the newest token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// When the newest token was saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Expiry of the newest token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Whether the newest token has expired.
    pub expired: bool,
}

/// POST /api/auth/token
pub async fn save(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<SaveToken>, JsonRejection>,
) -> Result<Json<Value>> {
    let body = json_body(body)?;
    let token = non_blank(body.access_token.as_deref())
        .ok_or_else(|| ApiError::Validation("Access token is required".into()))?;
    let token_type = non_blank(Some(&body.token_type)).unwrap_or("page");
    let expires_at = non_blank(body.expires_at.as_deref());
    if let Some(ts) = expires_at {
        let _ = DateTime::parse_from_rfc3339(ts).map_err(|_| {
            ApiError::Validation("expires_at must be an RFC 3339 timestamp".into())
        })?;
    }

    let saved = state.store.save_token(token_type, token, expires_at)?;
    record_activity(
        &state,
        &headers,
        ActivityKind::SaveToken,
        &format!("Saved new {token_type} access token"),
        None,
    );
    Ok(Json(json!({ "success": true, "token_id": saved.id })))
}

/// GET /api/auth/token
pub async fn check(State(state): State<AppState>) -> Result<Json<TokenStatus>> {
    let status = match state.store.find_latest_token()? {
        None => TokenStatus::default(),
        Some(token) => TokenStatus {
            exists: true,
            expired: token.is_expired(),
            token_type: Some(token.token_type),
            created_at: Some(token.created_at),
            expires_at: token.expires_at,
        },
    };
    Ok(Json(status))
}

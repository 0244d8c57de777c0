//! Activity log listing.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_settings::ActivitySettings;

use crate::errors::{ApiError, Result};
use crate::server::AppState;

/// Query of `GET /api/activity-logs`.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// Maximum rows to return.
    pub limit: Option<u32>,
    /// Only rows for this contest.
    pub contest_id: Option<i64>,
}

/// Requested limit, defaulted and clamped to `1..=max_limit`.
pub fn effective_limit(requested: Option<u32>, settings: &ActivitySettings) -> u32 {
    requested
        .unwrap_or(settings.default_limit)
        .clamp(1, settings.max_limit.max(1))
}

/// GET /api/activity-logs
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ActivityQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(query) = query.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let limit = effective_limit(query.limit, &state.settings.activity);
    let logs = state.store.recent_activity(limit, query.contest_id)?;
    Ok(Json(json!({ "logs": logs })))
}

//! Reconciliation trigger.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::ActivityKind;

use super::{json_body, record_activity};
use crate::errors::{ApiError, Result};
use crate::server::AppState;

/// Body of `POST /api/process-comments`.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// Contest to reconcile.
    #[serde(default)]
    pub contest_id: Option<i64>,
}

/// POST /api/process-comments
pub async fn run(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let contest_id = json_body(body)?
        .contest_id
        .ok_or_else(|| ApiError::Validation("Contest ID is required".into()))?;
    let contest = state
        .store
        .find_contest(contest_id)?
        .ok_or_else(|| ApiError::NotFound("Contest not found".into()))?;

    let report = state.reconciler.run(contest_id).await?;

    record_activity(
        &state,
        &headers,
        ActivityKind::ProcessComments,
        &format!(
            "Processed {} comments for contest \"{}\"",
            report.processed, contest.name
        ),
        Some(contest_id),
    );
    Ok(Json(json!({ "success": true, "results": report })))
}

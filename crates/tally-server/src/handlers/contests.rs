//! Contest CRUD.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use tally_core::ActivityKind;
use tally_store::ContestUpdate;

use super::{json_body, non_blank, record_activity};
use crate::errors::{ApiError, Result};
use crate::server::AppState;

/// Body of `POST /api/contests`.
#[derive(Debug, Deserialize)]
pub struct CreateContest {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// External post ID.
    #[serde(default)]
    pub post_id: Option<String>,
    /// Optional notes.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PATCH /api/contests/{id}`. Absent fields are left unchanged;
/// `"description": null` clears the description.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateContest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New external post ID.
    #[serde(default)]
    pub post_id: Option<String>,
    /// New description.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

/// Distinguish a present `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn contest_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::Validation("Invalid contest ID".into()))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Contest not found".into())
}

/// GET /api/contests
pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let contests = state.store.list_contests()?;
    record_activity(
        &state,
        &headers,
        ActivityKind::ListContests,
        &format!("Listed {} contests", contests.len()),
        None,
    );
    Ok(Json(json!({ "contests": contests })))
}

/// POST /api/contests
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<CreateContest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let body = json_body(body)?;
    let (Some(name), Some(post_id)) = (
        non_blank(body.name.as_deref()),
        non_blank(body.post_id.as_deref()),
    ) else {
        return Err(ApiError::Validation("Name and post ID are required".into()));
    };
    let description = non_blank(body.description.as_deref());

    let contest = state.store.create_contest(name, post_id, description)?;
    record_activity(
        &state,
        &headers,
        ActivityKind::CreateContest,
        &format!("Created contest \"{}\"", contest.name),
        Some(contest.id),
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "contest": contest })),
    ))
}

/// GET /api/contests/{id}
pub async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>> {
    let id = contest_id(path)?;
    let contest = state.store.find_contest(id)?.ok_or_else(not_found)?;
    let entries = state.store.list_entries(id)?;
    record_activity(
        &state,
        &headers,
        ActivityKind::ViewContest,
        &format!("Viewed contest \"{}\"", contest.name),
        Some(contest.id),
    );
    Ok(Json(json!({ "contest": contest, "entries": entries })))
}

/// GET /api/contests/{id}/entries
pub async fn entries(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>> {
    let id = contest_id(path)?;
    if state.store.find_contest(id)?.is_none() {
        return Err(not_found());
    }
    let entries = state.store.list_entries(id)?;
    Ok(Json(json!({ "entries": entries })))
}

/// PATCH /api/contests/{id}
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<UpdateContest>, JsonRejection>,
) -> Result<Json<Value>> {
    let id = contest_id(path)?;
    let body = json_body(body)?;

    let mut update = ContestUpdate::default();
    if let Some(name) = body.name.as_deref() {
        let name = non_blank(Some(name))
            .ok_or_else(|| ApiError::Validation("Name cannot be empty".into()))?;
        update.name = Some(name.to_owned());
    }
    if let Some(post_id) = body.post_id.as_deref() {
        let post_id = non_blank(Some(post_id))
            .ok_or_else(|| ApiError::Validation("Post ID cannot be empty".into()))?;
        update.post_id = Some(post_id.to_owned());
    }
    if let Some(description) = body.description {
        update.description = Some(non_blank(description.as_deref()).map(str::to_owned));
    }

    let contest = state
        .store
        .update_contest(id, &update)?
        .ok_or_else(not_found)?;
    record_activity(
        &state,
        &headers,
        ActivityKind::UpdateContest,
        &format!("Updated contest \"{}\"", contest.name),
        Some(contest.id),
    );
    Ok(Json(json!({ "success": true, "contest": contest })))
}

/// DELETE /api/contests/{id}
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>> {
    let id = contest_id(path)?;
    let contest = state.store.find_contest(id)?.ok_or_else(not_found)?;
    if !state.store.delete_contest(id)? {
        return Err(not_found());
    }
    // The row is gone, so the log entry cannot reference it.
    record_activity(
        &state,
        &headers,
        ActivityKind::DeleteContest,
        &format!("Deleted contest \"{}\" (#{id})", contest.name),
        None,
    );
    Ok(Json(json!({ "success": true })))
}

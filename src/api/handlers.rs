use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use super::AppState;
use crate::accounts::Registration;
use crate::domain::{Case, CaseDraft, CasePatch, Hackathon, TeamDraft, User};
use crate::error::{AppError, Result};
use crate::session::Session;
use crate::workflow::TeamState;

/// Header carrying the caller's user id. The session itself lives on the
/// client; the server only rebuilds the context per request.
const USER_HEADER: &str = "x-user-id";

async fn session_from(state: &AppState, headers: &HeaderMap) -> Result<Session> {
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("missing X-User-Id header".to_string()))?;
    let user = state.accounts.by_id(user_id).await?;
    Ok(Session::new(user))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// --- Auth ---

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<Registration>,
) -> Result<Json<User>> {
    Ok(Json(state.accounts.register(registration).await?))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.accounts.login(&req.email, &req.password).await?))
}

// --- Team workflow ---

pub async fn team_state(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TeamState>> {
    let session = session_from(&state, &headers).await?;
    Ok(Json(state.workflow.current_state(&session).await?))
}

pub async fn create_team(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(draft): Json<TeamDraft>,
) -> Result<Json<TeamState>> {
    let session = session_from(&state, &headers).await?;
    Ok(Json(state.workflow.create_team(&session, draft).await?))
}

#[derive(Deserialize)]
pub struct JoinRequest {
    pub code: String,
}

pub async fn join_team(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<JoinRequest>,
) -> Result<Json<TeamState>> {
    let session = session_from(&state, &headers).await?;
    Ok(Json(state.workflow.join_with_code(&session, &req.code).await?))
}

pub async fn leave_team(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TeamState>> {
    let session = session_from(&state, &headers).await?;
    Ok(Json(state.workflow.leave_team(&session).await?))
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub name: String,
    pub file_name: String,
}

/// Upload an artifact: metadata in the query string, the file itself as
/// the raw request body.
pub async fn upload_artifact(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TeamState>> {
    let session = session_from(&state, &headers).await?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    Ok(Json(
        state
            .workflow
            .upload_artifact(&session, &query.name, &query.file_name, content_type, body)
            .await?,
    ))
}

#[derive(Deserialize)]
pub struct DeleteArtifactQuery {
    pub file_url: String,
}

pub async fn delete_artifact(
    State(state): State<Arc<AppState>>,
    Path(artifact_id): Path<String>,
    Query(query): Query<DeleteArtifactQuery>,
    headers: HeaderMap,
) -> Result<Json<TeamState>> {
    let session = session_from(&state, &headers).await?;
    Ok(Json(
        state
            .workflow
            .delete_artifact(&session, &artifact_id, &query.file_url)
            .await?,
    ))
}

// --- Hackathons ---

#[derive(Deserialize)]
pub struct HackathonsQuery {
    pub status: Option<String>,
}

pub async fn list_hackathons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HackathonsQuery>,
) -> Result<Json<Vec<Hackathon>>> {
    let hackathons = match query.status.as_deref() {
        None => state.hackathons.all().await?,
        Some("active") => state.hackathons.active().await?,
        Some("upcoming") => state.hackathons.upcoming().await?,
        Some("completed") => state.hackathons.completed().await?,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "unknown status filter: {other}"
            )))
        }
    };
    Ok(Json(hackathons))
}

pub async fn get_hackathon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Hackathon>> {
    Ok(Json(state.hackathons.by_id(&id).await?))
}

// --- Cases ---

pub async fn list_cases(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Case>>> {
    Ok(Json(state.cases.all().await?))
}

pub async fn create_case(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<CaseDraft>,
) -> Result<Json<Case>> {
    Ok(Json(state.cases.create(draft).await?))
}

pub async fn get_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Case>> {
    state
        .cases
        .by_id(&id)
        .await?
        .map(Json)
        .ok_or(AppError::CaseNotFound(id))
}

pub async fn update_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<CasePatch>,
) -> Result<Json<Case>> {
    Ok(Json(state.cases.update(&id, patch).await?))
}

pub async fn delete_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.cases.delete(&id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn assign_team_to_case(
    State(state): State<Arc<AppState>>,
    Path((case_id, team_id)): Path<(String, String)>,
) -> Result<Json<Case>> {
    Ok(Json(state.cases.assign_team(&case_id, &team_id).await?))
}

pub async fn unassign_team_from_case(
    State(state): State<Arc<AppState>>,
    Path((case_id, team_id)): Path<(String, String)>,
) -> Result<Json<Case>> {
    Ok(Json(state.cases.unassign_team(&case_id, &team_id).await?))
}

pub async fn add_link_to_case(
    State(state): State<Arc<AppState>>,
    Path((case_id, link_id)): Path<(String, String)>,
) -> Result<Json<Case>> {
    Ok(Json(state.cases.add_link(&case_id, &link_id).await?))
}

pub async fn remove_link_from_case(
    State(state): State<Arc<AppState>>,
    Path((case_id, link_id)): Path<(String, String)>,
) -> Result<Json<Case>> {
    Ok(Json(state.cases.remove_link(&case_id, &link_id).await?))
}

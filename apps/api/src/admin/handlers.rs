//! Axum route handlers for the admin console. Every handler requires an
//! `AdminSession` and drives one `AdminConsole` for the duration of the request.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::admin::console::{ApplicationEntry, Confirmation, Dashboard};
use crate::admin::session::AdminSession;
use crate::errors::AppError;
use crate::models::job::{JobFields, JobPosting};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActiveToggle {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub name: Option<String>,
}

/// GET /api/v1/admin/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<Json<Dashboard>, AppError> {
    let mut console = state.console(session);
    Ok(Json(console.dashboard().await?))
}

/// GET /api/v1/admin/jobs
pub async fn handle_list_all_jobs(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let mut console = state.console(session);
    Ok(Json(console.refresh_jobs().await?.to_vec()))
}

/// POST /api/v1/admin/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    session: AdminSession,
    Json(fields): Json<JobFields>,
) -> Result<(StatusCode, Json<Vec<JobPosting>>), AppError> {
    let mut console = state.console(session);
    console.open_create_form()?;
    let jobs = console.submit_form(&fields).await?.to_vec();
    Ok((StatusCode::CREATED, Json(jobs)))
}

/// GET /api/v1/admin/jobs/:id
/// Returns the edit form pre-filled from the stored posting.
pub async fn handle_edit_form(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<JobFields>, AppError> {
    let mut console = state.console(session);
    Ok(Json(console.open_edit_form(id).await?))
}

/// PUT /api/v1/admin/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<Uuid>,
    Json(fields): Json<JobFields>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let mut console = state.console(session);
    console.open_edit_form(id).await?;
    Ok(Json(console.submit_form(&fields).await?.to_vec()))
}

/// PATCH /api/v1/admin/jobs/:id/active
pub async fn handle_set_active(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<Uuid>,
    Json(req): Json<ActiveToggle>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let mut console = state.console(session);
    Ok(Json(console.set_job_active(id, req.is_active).await?.to_vec()))
}

/// DELETE /api/v1/admin/jobs/:id?confirm=true
pub async fn handle_delete_job(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let mut console = state.console(session);
    let jobs = console
        .delete_job(id, Confirmation::from(params.confirm))
        .await?;
    Ok(Json(jobs.to_vec()))
}

/// GET /api/v1/admin/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<Json<Vec<ApplicationEntry>>, AppError> {
    Ok(Json(state.console(session).job_applications().await?))
}

/// GET /api/v1/admin/applications/spontaneous
pub async fn handle_list_spontaneous(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<Json<Vec<ApplicationEntry>>, AppError> {
    Ok(Json(state.console(session).spontaneous_applications().await?))
}

/// GET /api/v1/admin/resumes/:key?name=<candidate>
pub async fn handle_download_resume(
    State(state): State<AppState>,
    session: AdminSession,
    Path(key): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, AppError> {
    let candidate = params.name.unwrap_or_default();
    let file = state
        .console(session)
        .download_resume(&key, &candidate)
        .await?;

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        file.file_name
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// POST /api/v1/admin/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<StatusCode, AppError> {
    state.console(session).sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

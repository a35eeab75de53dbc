use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::{JobCard, ListingView};
use crate::state::AppState;

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<ListingView> {
    Json(state.listing().load().await)
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobCard>, AppError> {
    Ok(Json(state.listing().open_posting(id).await?))
}

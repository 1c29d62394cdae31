use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use jobs::JobStatus;
use types::GenerateResult;

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Job status", body = JobStatus),
            (status = 404, description = "Unknown job")
        )
    )]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    state
        .jobs
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("job", &id))
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/result",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Report and full roster", body = GenerateResult),
            (status = 404, description = "Unknown job"),
            (status = 409, description = "Job still queued or running"),
            (status = 500, description = "Job failed")
        )
    )]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GenerateResult>, ApiError> {
    match state.jobs.get(&id) {
        Some(JobStatus::Done { result }) => Ok(Json(result)),
        Some(JobStatus::Failed { message }) => {
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message))
        }
        Some(_) => Err(ApiError::new(StatusCode::CONFLICT, format!("job {id} not finished"))),
        None => Err(ApiError::not_found("job", &id)),
    }
}

use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, Json};
use sched_core::{validate_request, validate_roster};
use serde::Serialize;
use types::GenerateRequest;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
        post,
        path = "/v1/generate",
        request_body = GenerateRequest,
        responses(
            (status = 200, description = "Job enqueued", body = JobCreated),
            (status = 400, description = "Catalog, options, subject selection or roster ids rejected")
        )
    )]
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<JobCreated>, ApiError> {
    validate_request(&req.catalog, &req.options, &req.only)?;
    validate_roster(&req.roster)?;
    let id = state.jobs.enqueue(req);
    Ok(Json(JobCreated {
        job_id: id.0,
        status: "queued",
    }))
}

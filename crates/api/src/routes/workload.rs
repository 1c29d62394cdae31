use crate::error::ApiError;
use axum::Json;
use sched_core::{validate, workload::workload_report};
use serde::Deserialize;
use types::{Catalog, RunOptions, Session, WorkloadReport};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct WorkloadIn {
    pub catalog: Catalog,
    #[serde(default)]
    pub roster: Vec<Session>,
    /// Ceiling factor over the reference workload, 1.5 when absent.
    pub tolerance: Option<f64>,
}

#[utoipa::path(
    post,
    path = "/v1/workload",
    request_body = WorkloadIn,
    responses(
        (status = 200, description = "Credited hours per instructor", body = WorkloadReport),
        (status = 400, description = "Invalid catalog or tolerance")
    )
)]
pub async fn workload(Json(input): Json<WorkloadIn>) -> Result<Json<WorkloadReport>, ApiError> {
    validate(&input.catalog)?;
    let tolerance = input
        .tolerance
        .unwrap_or_else(|| RunOptions::default().tolerance);
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(ApiError::bad_request(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }
    Ok(Json(workload_report(&input.catalog, &input.roster, tolerance)))
}

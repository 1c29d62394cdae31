use axum::Json;
use sched_core::validate;
use serde::Serialize;
use types::Catalog;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = Catalog,
    responses(
    (status = 200, description = "Every problem found in the catalog", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(catalog): Json<Catalog>) -> Json<ValidationReport> {
    match validate(&catalog) {
        Ok(()) => Json(ValidationReport { ok: true, errors: vec![] }),
        Err(e) => Json(ValidationReport {
            ok: false,
            errors: e.errors().to_vec(),
        }),
    }
}

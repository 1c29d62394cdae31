use axum::Json;
use sched_core::conflict::{audit, ConflictReason};
use serde::Serialize;
use types::{Session, SessionId};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct DoubleBooking {
    pub session: SessionId,
    pub with: SessionId,
    #[schema(value_type = String, example = "room")]
    pub reason: ConflictReason,
}

#[utoipa::path(
    post,
    path = "/v1/audit",
    request_body = Vec<Session>,
    responses(
    (status = 200, description = "Every double-booked pair, empty when the roster is clean", body = Vec<DoubleBooking>)
    )
)]
pub async fn audit_handler(Json(roster): Json<Vec<Session>>) -> Json<Vec<DoubleBooking>> {
    Json(
        audit(&roster)
            .into_iter()
            .map(|(session, c)| DoubleBooking {
                session,
                with: c.with,
                reason: c.reason,
            })
            .collect(),
    )
}

mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod audit;
    pub mod generate;
    pub mod health;
    pub mod jobs;
    pub mod validate;
    pub mod workload;
}

use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::ServerConfig;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::validate::validate_handler,
            routes::generate::generate,
            routes::jobs::status,
            routes::jobs::result,
            routes::workload::workload,
            routes::audit::audit_handler,
        ),
        components(schemas(
            types::Catalog, types::Subject, types::KindHours, types::Room, types::RoomKind,
            types::Instructor, types::Preference, types::RoomPool, types::TimeGridDef,
            types::DayOfWeek, types::Timeslot, types::SlotId, types::SubjectId,
            types::InstructorId, types::RoomId, types::CurriculumId,
            types::Session, types::SessionId, types::SessionDetail, types::SessionKind,
            types::LabHalf, types::RunOptions, types::GenerateRequest, types::GenerateResult,
            types::GenerationReport, types::PlacementStats, types::PlacementWarning,
            types::WarningReason, types::NoSlotCause, types::RunStatus,
            types::WorkloadReport, types::InstructorLoad,
            jobs::JobId, jobs::JobStatus,
            routes::health::Health,
            routes::validate::ValidationReport,
            routes::generate::JobCreated,
            routes::workload::WorkloadIn,
            routes::audit::DoubleBooking
        )),
        tags(
            (name = "timetable", description = "Timetable generation API")
        )
    )]
struct ApiDoc;

fn app(state: state::AppState, cfg: &ServerConfig) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/generate", post(routes::generate::generate))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/workload", post(routes::workload::workload))
        .route("/v1/audit", post(routes::audit::audit_handler))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack(cfg.body_limit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ServerConfig::from_env()?;
    telemetry::init(cfg.log_format);

    let app = app(state::AppState::new_default(), &cfg);

    let addr = cfg.addr();
    tracing::info!(%addr, body_limit = cfg.body_limit, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use crate::{
    dto::{
        admin::{EventDetail, EventsResponse, MappingRequest, PhaseRequest, SeedRequest},
        common::Ack,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Admin-only endpoints for seeding events, driving phases, and mapping
/// boxes. Every route requires the shared admin secret header.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/admin/seed", post(seed_event))
        .route("/api/admin/status", post(set_phase))
        .route("/api/admin/map", post(set_box_mapping))
        .route("/api/admin/event/{code}", get(event_detail))
        .route("/api/admin/events", get(list_events))
        .route_layer(middleware::from_fn_with_state(state, require_admin_secret))
}

/// Seed a new event with its six boxes and the default places.
#[utoipa::path(
    post,
    path = "/api/admin/seed",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    request_body = SeedRequest,
    responses(
        (status = 200, description = "Event seeded", body = Ack),
        (status = 409, description = "Event code already in use")
    )
)]
pub async fn seed_event(
    State(state): State<SharedState>,
    Json(payload): Json<SeedRequest>,
) -> Result<Json<Ack>, AppError> {
    admin_service::seed_event(&state, payload).await?;
    Ok(Json(Ack::ok()))
}

/// Move an event to a new phase and notify its room.
#[utoipa::path(
    post,
    path = "/api/admin/status",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    request_body = PhaseRequest,
    responses(
        (status = 200, description = "Phase updated", body = Ack),
        (status = 404, description = "Unknown event code")
    )
)]
pub async fn set_phase(
    State(state): State<SharedState>,
    Json(payload): Json<PhaseRequest>,
) -> Result<Json<Ack>, AppError> {
    admin_service::set_phase(&state, payload).await?;
    Ok(Json(Ack::ok()))
}

/// Map box numbers to their ground-truth places, atomically.
#[utoipa::path(
    post,
    path = "/api/admin/map",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    request_body = MappingRequest,
    responses(
        (status = 200, description = "Mapping applied", body = Ack),
        (status = 404, description = "Unknown event code, box number, or place name")
    )
)]
pub async fn set_box_mapping(
    State(state): State<SharedState>,
    Json(payload): Json<MappingRequest>,
) -> Result<Json<Ack>, AppError> {
    admin_service::set_box_mapping(&state, payload).await?;
    Ok(Json(Ack::ok()))
}

/// Detailed view of one event with per-box participation counters.
#[utoipa::path(
    get,
    path = "/api/admin/event/{code}",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret"),
    ("code" = String, Path, description = "Join code of the event")),
    responses(
        (status = 200, description = "Event detail", body = EventDetail),
        (status = 404, description = "Unknown event code")
    )
)]
pub async fn event_detail(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<EventDetail>, AppError> {
    Ok(Json(admin_service::event_detail(&state, &code).await?))
}

/// List every event, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/events",
    tag = "admin",
    params(("x-admin-secret" = String, Header, description = "Shared admin secret")),
    responses((status = 200, description = "All events", body = EventsResponse))
)]
pub async fn list_events(
    State(state): State<SharedState>,
) -> Result<Json<EventsResponse>, AppError> {
    Ok(Json(admin_service::list_events(&state).await?))
}

async fn require_admin_secret(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let presented = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    admin_service::require_admin(state.config(), presented)?;
    Ok(next.run(req).await)
}

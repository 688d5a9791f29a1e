use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};

use crate::{
    dto::auth::{MeResponse, RegisterRequest, RegisterResponse},
    error::AppError,
    routes::session_token,
    services::auth_service,
    state::SharedState,
};

/// Participant registration and session endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/register", post(register))
        .route("/api/me", get(me))
}

/// Register a participant into an event and mint a session token.
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Participant registered", body = RegisterResponse),
        (status = 404, description = "Unknown event code"),
        (status = 409, description = "Username already taken in this event")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    Ok(Json(auth_service::register(&state, payload).await?))
}

/// Describe the calling session.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "auth",
    params(("x-session-token" = String, Header, description = "Session token from registration")),
    responses(
        (status = 200, description = "Current session", body = MeResponse),
        (status = 401, description = "Missing or invalid session token")
    )
)]
pub async fn me(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    Ok(Json(
        auth_service::me(&state, session_token(&headers)).await?,
    ))
}

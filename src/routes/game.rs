use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
};

use crate::{
    dto::{
        common::Ack,
        game::{
            AnswersResponse, GuessRequest, GuessesResponse, PlacesResponse, RankRequest,
            RankingsResponse,
        },
        results::ResultsPayload,
    },
    error::AppError,
    routes::session_token,
    services::{game_service, results_service},
    state::SharedState,
};

/// Participant gameplay endpoints plus the public results snapshot.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/guess", post(submit_guess))
        .route("/api/guesses", get(my_guesses))
        .route("/api/rank", post(submit_ranking))
        .route("/api/rankings", get(my_rankings))
        .route("/api/places", get(list_places))
        .route("/api/answers", get(answers))
        .route("/api/events/{code}/results", get(event_results))
}

/// Record or revise the caller's guess for one box.
#[utoipa::path(
    post,
    path = "/api/guess",
    tag = "game",
    params(("x-session-token" = String, Header, description = "Session token from registration")),
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Guess recorded", body = Ack),
        (status = 400, description = "Invalid box, invalid place, or wrong phase"),
        (status = 401, description = "Missing or invalid session token")
    )
)]
pub async fn submit_guess(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<Ack>, AppError> {
    game_service::submit_guess(&state, session_token(&headers), payload).await?;
    Ok(Json(Ack::ok()))
}

/// Return the caller's stored guesses.
#[utoipa::path(
    get,
    path = "/api/guesses",
    tag = "game",
    params(("x-session-token" = String, Header, description = "Session token from registration")),
    responses(
        (status = 200, description = "Stored guesses", body = GuessesResponse),
        (status = 401, description = "Missing or invalid session token")
    )
)]
pub async fn my_guesses(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<GuessesResponse>, AppError> {
    Ok(Json(
        game_service::my_guesses(&state, session_token(&headers)).await?,
    ))
}

/// Record or replace the caller's top-three ranking.
#[utoipa::path(
    post,
    path = "/api/rank",
    tag = "game",
    params(("x-session-token" = String, Header, description = "Session token from registration")),
    request_body = RankRequest,
    responses(
        (status = 200, description = "Ranking recorded", body = Ack),
        (status = 400, description = "Boxes not distinct or out of range"),
        (status = 401, description = "Missing or invalid session token")
    )
)]
pub async fn submit_ranking(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<RankRequest>,
) -> Result<Json<Ack>, AppError> {
    game_service::submit_ranking(&state, session_token(&headers), payload).await?;
    Ok(Json(Ack::ok()))
}

/// Return the caller's stored ranking.
#[utoipa::path(
    get,
    path = "/api/rankings",
    tag = "game",
    params(("x-session-token" = String, Header, description = "Session token from registration")),
    responses(
        (status = 200, description = "Stored ranking entries", body = RankingsResponse),
        (status = 401, description = "Missing or invalid session token")
    )
)]
pub async fn my_rankings(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<RankingsResponse>, AppError> {
    Ok(Json(
        game_service::my_rankings(&state, session_token(&headers)).await?,
    ))
}

/// List the candidate origin places.
#[utoipa::path(
    get,
    path = "/api/places",
    tag = "game",
    responses((status = 200, description = "Candidate places", body = PlacesResponse))
)]
pub async fn list_places(
    State(state): State<SharedState>,
) -> Result<Json<PlacesResponse>, AppError> {
    Ok(Json(game_service::list_places(&state).await?))
}

/// Return the box-to-place answers for the caller's event.
#[utoipa::path(
    get,
    path = "/api/answers",
    tag = "game",
    params(("x-session-token" = String, Header, description = "Session token from registration")),
    responses(
        (status = 200, description = "Box answers", body = AnswersResponse),
        (status = 401, description = "Missing or invalid session token")
    )
)]
pub async fn answers(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<AnswersResponse>, AppError> {
    Ok(Json(
        game_service::answers(&state, session_token(&headers)).await?,
    ))
}

/// Return the full results snapshot for an event, by join code.
#[utoipa::path(
    get,
    path = "/api/events/{code}/results",
    tag = "game",
    params(("code" = String, Path, description = "Join code of the event")),
    responses(
        (status = 200, description = "Aggregated results", body = ResultsPayload),
        (status = 404, description = "Unknown event code")
    )
)]
pub async fn event_results(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<ResultsPayload>, AppError> {
    Ok(Json(results_service::results_for_code(&state, &code).await?))
}

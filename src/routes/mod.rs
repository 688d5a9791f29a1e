use axum::{Router, http::HeaderMap};

use crate::state::SharedState;

pub mod admin;
pub mod auth;
pub mod docs;
pub mod game;
pub mod health;
pub mod websocket;

/// Header carrying the anonymous session token minted at registration.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Extract the session token from request headers, if present.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(websocket::router())
        .merge(auth::router())
        .merge(game::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

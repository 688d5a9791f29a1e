/// Admin operations for event management.
pub mod admin_service;
/// Registration and session resolution.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Participant guess and ranking operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Broadcast helpers for per-event rooms.
pub mod live_events;
/// Results aggregation.
pub mod results_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;

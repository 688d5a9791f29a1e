//! WebSocket message shapes for the live results room.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::results::ResultsPayload, state::phase::EventPhase};

/// Messages accepted from room WebSocket clients.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Subscribe the connection to an event's room.
    #[serde(rename = "join", rename_all = "camelCase")]
    Join {
        /// Join code of the event to subscribe to.
        event_code: String,
    },
    /// Anything the server does not understand.
    #[serde(other)]
    Unknown,
}

/// Messages pushed to room WebSocket clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full-refresh results payload for the subscribed event.
    #[serde(rename = "results:update")]
    ResultsUpdate(ResultsPayload),
    /// Phase change notification.
    #[serde(rename = "event:status")]
    EventStatus {
        /// New phase of the event.
        status: EventPhase,
    },
    /// Join failure or other connection-scoped error.
    #[serde(rename = "error")]
    Error {
        /// Human-readable description.
        message: String,
    },
}

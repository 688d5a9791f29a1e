//! Push helpers for the per-event broadcast rooms.
//!
//! Every helper is best-effort: a failure is logged and swallowed so a
//! broken broadcast never bubbles into the mutation that triggered it, and
//! never touches any other event's room.

use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::ws::ServerMessage,
    services::results_service,
    state::{SharedState, phase::EventPhase},
};

/// Recompute the results payload for an event and push it to every room
/// member as a full refresh.
pub async fn broadcast_results(state: &SharedState, event_id: Uuid) {
    match results_service::results_for_event(state, event_id).await {
        Ok(payload) => send_room_message(state, event_id, &ServerMessage::ResultsUpdate(payload)),
        Err(err) => {
            warn!(%event_id, error = %err, "failed to rebuild results for broadcast");
        }
    }
}

/// Push a phase change notification to every room member.
pub fn broadcast_phase(state: &SharedState, event_id: Uuid, phase: EventPhase) {
    send_room_message(state, event_id, &ServerMessage::EventStatus { status: phase });
}

fn send_room_message(state: &SharedState, event_id: Uuid, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(payload) => state.rooms().broadcast(event_id, &payload),
        Err(err) => warn!(%event_id, error = %err, "failed to serialize room payload"),
    }
}

//! Admin request and response shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::EventEntity, dto::format_system_time, state::phase::EventPhase,
};

/// Payload seeding a brand-new event with its boxes and default places.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest {
    /// Join code for the new event.
    #[validate(length(min = 2, max = 20))]
    pub event_code: String,
    /// Display name for the new event.
    #[validate(length(min = 1, max = 100))]
    pub event_name: String,
}

/// Payload moving an event to a new phase.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PhaseRequest {
    /// Join code of the event.
    pub code: String,
    /// Requested target phase.
    pub status: EventPhase,
}

/// Payload mapping box numbers to their ground-truth places.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MappingRequest {
    /// Join code of the event.
    pub code: String,
    /// Box number to place name, applied atomically.
    #[schema(value_type = std::collections::BTreeMap<String, String>)]
    pub mappings: IndexMap<u8, String>,
}

/// Admin view of one box with participation counters.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminBoxView {
    /// Box number.
    pub number: u8,
    /// Mapped place name, if set.
    pub place_name: Option<String>,
    /// Guesses recorded against the box.
    pub guess_count: u32,
    /// Ranking entries recorded against the box.
    pub ranking_count: u32,
}

/// Detailed admin view of one event.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    /// Event identifier.
    pub id: Uuid,
    /// Join code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Current phase.
    pub status: EventPhase,
    /// Creation time, Rfc3339.
    pub created_at: String,
    /// Registered participants.
    pub user_count: u32,
    /// Per-box detail ordered by number.
    pub boxes: Vec<AdminBoxView>,
}

impl EventDetail {
    /// Build the detail view from an event, its participant count, and its
    /// per-box rows.
    pub fn from_entity(event: &EventEntity, user_count: u32, boxes: Vec<AdminBoxView>) -> Self {
        Self {
            id: event.id,
            code: event.code.clone(),
            name: event.name.clone(),
            status: event.phase,
            created_at: format_system_time(event.created_at),
            user_count,
            boxes,
        }
    }
}

/// One row of the admin event listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventListItem {
    /// Event identifier.
    pub id: Uuid,
    /// Join code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Current phase.
    pub status: EventPhase,
    /// Creation time, Rfc3339.
    pub created_at: String,
    /// Registered participants.
    pub user_count: u32,
    /// Boxes in the event.
    pub box_count: u32,
}

impl EventListItem {
    /// Build a listing row from an event and its child counts.
    pub fn from_entity(event: &EventEntity, user_count: u32, box_count: u32) -> Self {
        Self {
            id: event.id,
            code: event.code.clone(),
            name: event.name.clone(),
            status: event.phase,
            created_at: format_system_time(event.created_at),
            user_count,
            box_count,
        }
    }
}

/// Wrapper for the admin event listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventsResponse {
    /// Events, newest first.
    pub events: Vec<EventListItem>,
}

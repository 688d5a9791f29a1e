//! Registration and session shapes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{EventEntity, UserEntity},
    dto::validation::validate_username,
    state::phase::EventPhase,
};

/// Payload used to register a participant into an event.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Join code of the event to enter.
    #[validate(length(min = 2, max = 20))]
    pub event_code: String,
    /// Desired display name, unique within the event.
    #[validate(custom(function = "validate_username"))]
    pub username: String,
}

/// Public projection of a participant.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    /// User identifier.
    pub id: Uuid,
    /// Display name.
    pub username: String,
}

impl From<&UserEntity> for UserSummary {
    fn from(user: &UserEntity) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Public projection of an event.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventSummary {
    /// Event identifier.
    pub id: Uuid,
    /// Join code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Current phase.
    pub status: EventPhase,
}

impl From<&EventEntity> for EventSummary {
    fn from(event: &EventEntity) -> Self {
        Self {
            id: event.id,
            code: event.code.clone(),
            name: event.name.clone(),
            status: event.phase,
        }
    }
}

/// Response returned on successful registration. The token must be
/// presented in the `x-session-token` header on subsequent requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Newly created participant.
    pub user: UserSummary,
    /// Event the participant joined.
    pub event: EventSummary,
    /// Opaque anonymous session token.
    pub token: String,
}

/// Response for the current-session endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// Authenticated participant.
    pub user: UserSummary,
    /// Event the participant belongs to.
    pub event: EventSummary,
}
